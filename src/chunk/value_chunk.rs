use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use crate::chunk::format::{DecoderOptions, Run, RunKind, ValueLayout};
use crate::chunk::geometry::TileGeometry;
use crate::chunk::reader::{array_at, slice_at};
use crate::chunk::{CellIterator, ChunkMeta};
use crate::errors::{ClientError, DecodeError};
use crate::schema::{Attribute, Dimension, TypeId};

/// Position inside the run table. Copyable so probes can work on a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunCursor {
    run: usize,
    offset: u64,
    end: bool,
}

impl RunCursor {
    fn first(runs: &[Run]) -> Self {
        match runs.iter().position(|r| r.len > 0) {
            Some(run) => Self {
                run,
                offset: 0,
                end: false,
            },
            None => Self {
                run: runs.len(),
                offset: 0,
                end: true,
            },
        }
    }

    fn advance(&mut self, runs: &[Run]) -> bool {
        if self.end {
            return false;
        }
        self.offset += 1;
        while self.offset >= runs[self.run].len {
            self.run += 1;
            self.offset = 0;
            if self.run == runs.len() {
                self.end = true;
                return false;
            }
        }
        true
    }
}

/// Forward-only iterator over the cells of one attribute chunk.
#[derive(Debug, Clone)]
pub struct ValueChunk {
    meta: ChunkMeta,
    type_id: TypeId,
    payload: Bytes,
    layout: Option<ValueLayout>,
    geometry: Option<TileGeometry>,
    cursor: RunCursor,
    coords: Vec<i64>,
}

impl ValueChunk {
    /// Sentinel chunk that never yields a cell.
    pub fn end_of_array(meta: ChunkMeta, type_id: TypeId) -> Self {
        Self {
            meta,
            type_id,
            payload: Bytes::new(),
            layout: None,
            geometry: None,
            cursor: RunCursor {
                run: 0,
                offset: 0,
                end: true,
            },
            coords: Vec::new(),
        }
    }

    pub fn decode(
        meta: ChunkMeta,
        payload: Bytes,
        attribute: &Attribute,
        dimensions: &[Dimension],
        options: DecoderOptions,
    ) -> Result<Self, ClientError> {
        if meta.eof {
            return Ok(Self::end_of_array(meta, attribute.type_id.clone()));
        }
        if meta.compression_method != 0 {
            return Err(DecodeError::UnsupportedCompression(meta.compression_method).into());
        }

        let layout = ValueLayout::parse(&payload, options)?;
        let geometry = TileGeometry::new(dimensions, &meta.coordinates)?;
        if layout.total_cells > geometry.cell_count() {
            return Err(DecodeError::Malformed(format!(
                "chunk holds {} cells but its tile has room for {}",
                layout.total_cells,
                geometry.cell_count()
            ))
            .into());
        }
        debug!(
            target: "scidb_client::chunk",
            attribute = %attribute.name,
            runs = layout.runs.len(),
            cells = layout.total_cells,
            "decoded value chunk at {:?}",
            meta.coordinates
        );

        let cursor = RunCursor::first(&layout.runs);
        let mut chunk = Self {
            coords: vec![0; dimensions.len()],
            meta,
            type_id: attribute.type_id.clone(),
            payload,
            layout: Some(layout),
            geometry: Some(geometry),
            cursor,
        };
        chunk.refresh_coordinates();
        Ok(chunk)
    }

    pub fn meta(&self) -> &ChunkMeta {
        &self.meta
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn cell_count(&self) -> u64 {
        self.layout.as_ref().map(|l| l.total_cells).unwrap_or(0)
    }

    fn refresh_coordinates(&mut self) {
        if self.cursor.end {
            return;
        }
        let position = self.position();
        if let Some(geometry) = &self.geometry {
            geometry.coordinates_into(position, &mut self.coords);
        }
    }

    fn current_run(&self) -> Result<(&ValueLayout, Run), DecodeError> {
        let layout = self.layout.as_ref().ok_or(DecodeError::EndOfArray)?;
        if self.cursor.end {
            return Err(DecodeError::EndOfChunk);
        }
        Ok((layout, layout.runs[self.cursor.run]))
    }

    /// Whether the current cell is null. Fails once the chunk is exhausted.
    pub fn is_null(&self) -> Result<bool, DecodeError> {
        let (_, run) = self.current_run()?;
        Ok(matches!(run.kind, RunKind::Nulls { .. }))
    }

    pub fn missing_reason(&self) -> Option<u32> {
        match self.current_run() {
            Ok((
                _,
                Run {
                    kind: RunKind::Nulls { missing_reason },
                    ..
                },
            )) => Some(missing_reason),
            _ => None,
        }
    }

    /// Slot index of the current cell's value.
    fn slot(&self) -> Result<(&ValueLayout, u64), DecodeError> {
        let (layout, run) = self.current_run()?;
        match run.kind.slot(self.cursor.offset) {
            Some(slot) => Ok((layout, slot)),
            None => Err(DecodeError::NullCell {
                missing_reason: match run.kind {
                    RunKind::Nulls { missing_reason } => missing_reason,
                    _ => 0,
                },
            }),
        }
    }

    /// Byte offset of the current cell's value slot.
    fn value_offset(&self) -> Result<usize, DecodeError> {
        let (layout, slot) = self.slot()?;
        let overflow = || DecodeError::Malformed(format!("value slot {} overflows", slot));
        usize::try_from(slot)
            .ok()
            .and_then(|s| s.checked_mul(layout.slot_size()))
            .and_then(|off| off.checked_add(layout.payload_start))
            .ok_or_else(overflow)
    }

    fn require(&self, ok: bool, requested: &'static str) -> Result<(), DecodeError> {
        if ok {
            Ok(())
        } else {
            Err(DecodeError::UnsupportedType {
                type_id: self.type_id.to_string(),
                requested,
            })
        }
    }

    fn fixed<const N: usize>(&self) -> Result<[u8; N], DecodeError> {
        let offset = self.value_offset()?;
        array_at::<N>(&self.payload, offset)
    }

    pub fn get_i8(&self) -> Result<i8, DecodeError> {
        self.require(self.type_id == TypeId::Int8, "int8")?;
        Ok(i8::from_le_bytes(self.fixed()?))
    }

    pub fn get_i16(&self) -> Result<i16, DecodeError> {
        self.require(self.type_id == TypeId::Int16, "int16")?;
        Ok(i16::from_le_bytes(self.fixed()?))
    }

    pub fn get_i32(&self) -> Result<i32, DecodeError> {
        self.require(self.type_id == TypeId::Int32, "int32")?;
        Ok(i32::from_le_bytes(self.fixed()?))
    }

    pub fn get_i64(&self) -> Result<i64, DecodeError> {
        self.require(self.type_id == TypeId::Int64, "int64")?;
        Ok(i64::from_le_bytes(self.fixed()?))
    }

    pub fn get_u8(&self) -> Result<u8, DecodeError> {
        self.require(self.type_id == TypeId::Uint8, "uint8")?;
        Ok(u8::from_le_bytes(self.fixed()?))
    }

    pub fn get_u16(&self) -> Result<u16, DecodeError> {
        self.require(self.type_id == TypeId::Uint16, "uint16")?;
        Ok(u16::from_le_bytes(self.fixed()?))
    }

    pub fn get_u32(&self) -> Result<u32, DecodeError> {
        self.require(self.type_id == TypeId::Uint32, "uint32")?;
        Ok(u32::from_le_bytes(self.fixed()?))
    }

    pub fn get_u64(&self) -> Result<u64, DecodeError> {
        self.require(self.type_id == TypeId::Uint64, "uint64")?;
        Ok(u64::from_le_bytes(self.fixed()?))
    }

    pub fn get_f32(&self) -> Result<f32, DecodeError> {
        self.require(self.type_id == TypeId::Float, "float")?;
        Ok(f32::from_le_bytes(self.fixed()?))
    }

    pub fn get_f64(&self) -> Result<f64, DecodeError> {
        self.require(self.type_id == TypeId::Double, "double")?;
        Ok(f64::from_le_bytes(self.fixed()?))
    }

    pub fn get_char(&self) -> Result<char, DecodeError> {
        self.require(self.type_id == TypeId::Char, "char")?;
        let [b] = self.fixed::<1>()?;
        Ok(b as char)
    }

    /// Booleans are bit-packed from the start of the value area; the slot
    /// index doubles as the bit index.
    pub fn get_bool(&self) -> Result<bool, DecodeError> {
        self.require(
            matches!(self.type_id, TypeId::Bool | TypeId::Indicator),
            "bool",
        )?;
        let (layout, slot) = self.slot()?;
        let byte_index = usize::try_from(slot >> 3)
            .ok()
            .and_then(|b| b.checked_add(layout.payload_start))
            .ok_or_else(|| DecodeError::Malformed(format!("bit {} overflows", slot)))?;
        let [byte] = array_at::<1>(&self.payload, byte_index)?;
        Ok(byte & (1 << (slot & 7)) != 0)
    }

    /// Raw bytes of a variable-length value, terminator included.
    fn var_bytes(&self) -> Result<&[u8], DecodeError> {
        let (layout, _) = self.slot()?;
        let slot_offset = self.value_offset()?;
        let rel = u32::from_le_bytes(array_at::<4>(&self.payload, slot_offset)?) as usize;
        let at = layout
            .var_area_start()
            .checked_add(rel)
            .ok_or_else(|| DecodeError::Malformed(format!("var offset {} overflows", rel)))?;

        let [short_len] = array_at::<1>(&self.payload, at)?;
        let (len, data_at) = if short_len != 0 {
            (short_len as usize, at + 1)
        } else {
            let long_len = u32::from_le_bytes(array_at::<4>(&self.payload, at + 1)?);
            (long_len as usize, at + 5)
        };
        slice_at(&self.payload, data_at, len)
    }

    pub fn get_string(&self) -> Result<String, DecodeError> {
        match self.type_id {
            TypeId::String => {
                let bytes = self.var_bytes()?;
                let Some((_, text)) = bytes.split_last() else {
                    return Err(DecodeError::Malformed(
                        "string without terminator".to_string(),
                    ));
                };
                Ok(String::from_utf8(text.to_vec())?)
            }
            TypeId::FixedString(n) => {
                let offset = self.value_offset()?;
                let raw = slice_at(&self.payload, offset, n)?;
                let text = raw.split(|&b| b == 0).next().unwrap_or(raw);
                Ok(String::from_utf8(text.to_vec())?)
            }
            _ => Err(DecodeError::UnsupportedType {
                type_id: self.type_id.to_string(),
                requested: "string",
            }),
        }
    }

    pub fn get_binary(&self) -> Result<Vec<u8>, DecodeError> {
        self.require(self.type_id == TypeId::Binary, "binary")?;
        Ok(self.var_bytes()?.to_vec())
    }

    /// Seconds since the epoch, UTC.
    pub fn get_datetime(&self) -> Result<DateTime<Utc>, DecodeError> {
        self.require(self.type_id == TypeId::Datetime, "datetime")?;
        let secs = i64::from_le_bytes(self.fixed()?);
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| DecodeError::Malformed(format!("datetime {} out of range", secs)))
    }

    /// Seconds since the epoch followed by the zone offset in seconds.
    pub fn get_datetimetz(&self) -> Result<DateTime<FixedOffset>, DecodeError> {
        self.require(self.type_id == TypeId::DatetimeTz, "datetimetz")?;
        let raw = self.fixed::<16>()?;
        let mut secs = [0u8; 8];
        let mut offset = [0u8; 8];
        secs.copy_from_slice(&raw[..8]);
        offset.copy_from_slice(&raw[8..]);
        let secs = i64::from_le_bytes(secs);
        let offset = i64::from_le_bytes(offset);

        let zone = i32::try_from(offset)
            .ok()
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| DecodeError::Malformed(format!("zone offset {} out of range", offset)))?;
        let utc = DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| DecodeError::Malformed(format!("datetime {} out of range", secs)))?;
        Ok(utc.with_timezone(&zone))
    }
}

impl CellIterator for ValueChunk {
    fn attribute_id(&self) -> u32 {
        self.meta.attribute_id
    }

    fn end_of_array(&self) -> bool {
        self.layout.is_none()
    }

    fn end_of_chunk(&self) -> bool {
        self.cursor.end
    }

    fn has_next(&self) -> bool {
        let Some(layout) = &self.layout else {
            return false;
        };
        let mut probe = self.cursor;
        probe.advance(&layout.runs)
    }

    fn advance(&mut self) -> bool {
        let moved = match &self.layout {
            Some(layout) => self.cursor.advance(&layout.runs),
            None => false,
        };
        if moved {
            self.refresh_coordinates();
        }
        moved
    }

    fn position(&self) -> u64 {
        match &self.layout {
            Some(layout) if !self.cursor.end => {
                layout.runs[self.cursor.run].start + self.cursor.offset
            }
            _ => self.cell_count(),
        }
    }

    fn coordinates(&self) -> Result<&[i64], DecodeError> {
        if self.layout.is_none() {
            return Err(DecodeError::EndOfArray);
        }
        if self.cursor.end {
            return Err(DecodeError::EndOfChunk);
        }
        Ok(&self.coords)
    }
}
