use bytes::Bytes;

use crate::chunk::format::BITMAP_PAYLOAD_MAGIC;

/// Builds empty-bitmap payloads from `(l_position, length)` segments.
pub struct BitmapPayloadFactory {
    magic: u64,
    segments: Vec<(u64, u64)>,
    n_non_empty: Option<u64>,
}

impl BitmapPayloadFactory {
    pub fn new() -> Self {
        Self {
            magic: BITMAP_PAYLOAD_MAGIC,
            segments: Vec::new(),
            n_non_empty: None,
        }
    }

    pub fn with_magic(mut self, magic: u64) -> Self {
        self.magic = magic;
        self
    }

    pub fn segment(mut self, l_position: u64, length: u64) -> Self {
        self.segments.push((l_position, length));
        self
    }

    /// Overrides the present-cell count written in the header.
    pub fn with_non_empty(mut self, n: u64) -> Self {
        self.n_non_empty = Some(n);
        self
    }

    pub fn create(self) -> Bytes {
        let covered: u64 = self.segments.iter().map(|(_, len)| len).sum();
        let mut out = Vec::new();
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&(self.segments.len() as i64).to_le_bytes());
        out.extend_from_slice(&(self.n_non_empty.unwrap_or(covered) as i64).to_le_bytes());

        let mut p_position = 0u64;
        for (l_position, length) in &self.segments {
            out.extend_from_slice(&(*l_position as i64).to_le_bytes());
            out.extend_from_slice(&(*length as i64).to_le_bytes());
            out.extend_from_slice(&(p_position as i64).to_le_bytes());
            p_position += length;
        }
        Bytes::from(out)
    }
}
