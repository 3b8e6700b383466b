//! Wire layout of chunk payloads.
//!
//! Value payload:
//! [magic:u64][n_segs:i64][elem_size:i64][data_size:i64][var_offs:i64][is_boolean:u8][pad:7]
//! then `n_segs + 1` segments of [p_position:i64][packed:u32], the last one a
//! sentinel whose position is the cell count. Values start right after.
//!
//! Bitmap payload:
//! [magic:u64][n_segs:i64][n_non_empty:i64] then `n_segs` segments of
//! [l_position:i64][length:i64][p_position:i64].

use tracing::warn;

use crate::chunk::reader::LeSliceReader;
use crate::errors::{ClientError, DecodeError, ProtocolError};

pub const VALUE_PAYLOAD_MAGIC: u64 = 0xDDDD_AAAA_000E_AAAC;
pub const BITMAP_PAYLOAD_MAGIC: u64 = 0xEEEE_AAAA_00EE_BAAC;

pub const VALUE_HEADER_LEN: usize = 48;
pub const VALUE_SEGMENT_LEN: usize = 12;
pub const BITMAP_HEADER_LEN: usize = 24;
pub const BITMAP_SEGMENT_LEN: usize = 24;

const VALUE_INDEX_MASK: u32 = 0x3FFF_FFFF;
const SAME_BIT: u32 = 1 << 30;
const NULL_BIT: u32 = 1 << 31;

/// Slot width used for variable-length values (an offset into the var area).
pub const VAR_SLOT_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    pub validate_magic: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            validate_magic: true,
        }
    }
}

fn check_magic(expected: u64, found: u64, options: DecoderOptions) -> Result<(), ClientError> {
    if expected == found {
        return Ok(());
    }
    if options.validate_magic {
        return Err(ProtocolError::BadMagic { expected, found }.into());
    }
    warn!(
        target: "scidb_client::chunk",
        "payload magic mismatch: expected {:#018x}, found {:#018x}", expected, found
    );
    Ok(())
}

fn non_negative(value: i64, field: &str) -> Result<u64, DecodeError> {
    u64::try_from(value)
        .map_err(|_| DecodeError::Malformed(format!("negative {}: {}", field, value)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuePayloadHeader {
    pub magic: u64,
    pub n_segs: u64,
    pub elem_size: u64,
    pub data_size: u64,
    pub var_offs: u64,
    pub is_boolean: bool,
}

impl ValuePayloadHeader {
    pub fn read_from(r: &mut LeSliceReader<'_>) -> Result<Self, DecodeError> {
        let magic = r.read_u64()?;
        let n_segs = non_negative(r.read_i64()?, "segment count")?;
        let elem_size = non_negative(r.read_i64()?, "element size")?;
        let data_size = non_negative(r.read_i64()?, "data size")?;
        let var_offs = non_negative(r.read_i64()?, "var offset")?;
        let is_boolean = r.read_u8()? != 0;
        r.skip(7)?;
        Ok(Self {
            magic,
            n_segs,
            elem_size,
            data_size,
            var_offs,
            is_boolean,
        })
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&(self.n_segs as i64).to_le_bytes());
        out.extend_from_slice(&(self.elem_size as i64).to_le_bytes());
        out.extend_from_slice(&(self.data_size as i64).to_le_bytes());
        out.extend_from_slice(&(self.var_offs as i64).to_le_bytes());
        out.push(self.is_boolean as u8);
        out.extend_from_slice(&[0u8; 7]);
    }
}

/// How the cells of one run find their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Consecutive slots starting at `base`.
    Literal { base: u32 },
    /// Every cell shares the slot at `value_index`.
    Repeated { value_index: u32 },
    /// No data; the index field carries a missing-reason code.
    Nulls { missing_reason: u32 },
}

impl RunKind {
    pub fn from_packed(packed: u32) -> Self {
        let index = packed & VALUE_INDEX_MASK;
        if packed & NULL_BIT != 0 {
            RunKind::Nulls {
                missing_reason: index,
            }
        } else if packed & SAME_BIT != 0 {
            RunKind::Repeated { value_index: index }
        } else {
            RunKind::Literal { base: index }
        }
    }

    pub fn packed(self) -> u32 {
        match self {
            RunKind::Literal { base } => base & VALUE_INDEX_MASK,
            RunKind::Repeated { value_index } => (value_index & VALUE_INDEX_MASK) | SAME_BIT,
            RunKind::Nulls { missing_reason } => (missing_reason & VALUE_INDEX_MASK) | NULL_BIT,
        }
    }

    /// Slot index holding the value of the cell `offset` cells into the run.
    pub fn slot(self, offset: u64) -> Option<u64> {
        match self {
            RunKind::Literal { base } => Some(base as u64 + offset),
            RunKind::Repeated { value_index } => Some(value_index as u64),
            RunKind::Nulls { .. } => None,
        }
    }
}

/// One RLE run over physical cell positions `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: u64,
    pub len: u64,
    pub kind: RunKind,
}

/// Parsed layout of a value payload; the bytes stay with the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueLayout {
    pub header: ValuePayloadHeader,
    pub runs: Vec<Run>,
    pub total_cells: u64,
    pub payload_start: usize,
}

impl ValueLayout {
    pub fn parse(payload: &[u8], options: DecoderOptions) -> Result<Self, ClientError> {
        let mut r = LeSliceReader::new(payload);
        let header = ValuePayloadHeader::read_from(&mut r)?;
        check_magic(VALUE_PAYLOAD_MAGIC, header.magic, options)?;

        let seg_count = header.n_segs as usize + 1;
        let needed = seg_count.checked_mul(VALUE_SEGMENT_LEN);
        if needed.is_none_or(|n| n > r.remaining()) {
            return Err(DecodeError::Malformed(format!(
                "{} segments do not fit in {} remaining bytes",
                header.n_segs,
                r.remaining()
            ))
            .into());
        }

        let mut raw = Vec::with_capacity(seg_count);
        for _ in 0..seg_count {
            let position = non_negative(r.read_i64()?, "segment position")?;
            let packed = r.read_u32()?;
            raw.push((position, packed));
        }

        if let Some(&(first, _)) = raw.first() {
            if header.n_segs > 0 && first != 0 {
                return Err(
                    DecodeError::Malformed(format!("first segment starts at {}", first)).into(),
                );
            }
        }

        let mut runs = Vec::with_capacity(header.n_segs as usize);
        for pair in raw.windows(2) {
            let (start, packed) = pair[0];
            let (end, _) = pair[1];
            if end < start {
                return Err(DecodeError::Malformed(format!(
                    "segment positions out of order: {} after {}",
                    end, start
                ))
                .into());
            }
            runs.push(Run {
                start,
                len: end - start,
                kind: RunKind::from_packed(packed),
            });
        }

        let total_cells = runs.iter().map(|run| run.len).sum();
        Ok(Self {
            header,
            runs,
            total_cells,
            payload_start: r.position(),
        })
    }

    /// Width of one value slot.
    pub fn slot_size(&self) -> usize {
        if self.header.elem_size == 0 {
            VAR_SLOT_SIZE
        } else {
            self.header.elem_size as usize
        }
    }

    pub fn var_area_start(&self) -> usize {
        self.payload_start + self.header.var_offs as usize
    }
}

/// One bitmap run: logical positions `[l_position, l_position + length)` are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapSegment {
    pub l_position: u64,
    pub length: u64,
    pub p_position: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapLayout {
    pub segments: Vec<BitmapSegment>,
    pub n_non_empty: u64,
}

impl BitmapLayout {
    pub fn parse(payload: &[u8], options: DecoderOptions) -> Result<Self, ClientError> {
        let mut r = LeSliceReader::new(payload);
        let magic = r.read_u64()?;
        check_magic(BITMAP_PAYLOAD_MAGIC, magic, options)?;
        let n_segs = non_negative(r.read_i64()?, "segment count")?;
        let n_non_empty = non_negative(r.read_i64()?, "non-empty count")?;

        let needed = (n_segs as usize).checked_mul(BITMAP_SEGMENT_LEN);
        if needed.is_none_or(|n| n > r.remaining()) {
            return Err(DecodeError::Malformed(format!(
                "{} bitmap segments do not fit in {} remaining bytes",
                n_segs,
                r.remaining()
            ))
            .into());
        }

        let mut segments: Vec<BitmapSegment> = Vec::with_capacity(n_segs as usize);
        let mut covered = 0u64;
        for _ in 0..n_segs {
            let seg = BitmapSegment {
                l_position: non_negative(r.read_i64()?, "logical position")?,
                length: non_negative(r.read_i64()?, "segment length")?,
                p_position: non_negative(r.read_i64()?, "physical position")?,
            };
            if seg.length == 0 {
                return Err(DecodeError::Malformed("empty bitmap segment".to_string()).into());
            }
            if let Some(prev) = segments.last() {
                if seg.l_position < prev.l_position + prev.length {
                    return Err(DecodeError::Malformed(format!(
                        "bitmap segment at {} overlaps the previous one",
                        seg.l_position
                    ))
                    .into());
                }
            }
            covered += seg.length;
            segments.push(seg);
        }

        if covered != n_non_empty {
            return Err(DecodeError::Malformed(format!(
                "bitmap segments cover {} cells but header says {}",
                covered, n_non_empty
            ))
            .into());
        }

        Ok(Self {
            segments,
            n_non_empty,
        })
    }

    /// One past the highest logical position present.
    pub fn logical_end(&self) -> u64 {
        self.segments
            .last()
            .map(|s| s.l_position + s.length)
            .unwrap_or(0)
    }
}
