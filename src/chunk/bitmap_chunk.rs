use bytes::Bytes;
use tracing::debug;

use crate::chunk::format::{BitmapLayout, BitmapSegment, DecoderOptions};
use crate::chunk::geometry::TileGeometry;
use crate::chunk::{CellIterator, ChunkMeta};
use crate::errors::{ClientError, DecodeError};
use crate::schema::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitmapCursor {
    segment: usize,
    logical: u64,
    visited: u64,
    end: bool,
}

impl BitmapCursor {
    fn first(segments: &[BitmapSegment]) -> Self {
        match segments.first() {
            Some(seg) => Self {
                segment: 0,
                logical: seg.l_position,
                visited: 0,
                end: false,
            },
            None => Self {
                segment: 0,
                logical: 0,
                visited: 0,
                end: true,
            },
        }
    }

    fn advance(&mut self, layout: &BitmapLayout) -> bool {
        if self.end {
            return false;
        }
        self.logical += 1;
        self.visited += 1;
        let seg = layout.segments[self.segment];
        if self.logical >= seg.l_position + seg.length {
            self.segment += 1;
            if self.segment == layout.segments.len() || self.visited > layout.n_non_empty {
                self.end = true;
                return false;
            }
            self.logical = layout.segments[self.segment].l_position;
        }
        true
    }
}

/// Iterates the logical positions of the present cells in one tile.
#[derive(Debug, Clone)]
pub struct EmptyBitmapChunk {
    meta: ChunkMeta,
    layout: Option<BitmapLayout>,
    geometry: Option<TileGeometry>,
    cursor: BitmapCursor,
    coords: Vec<i64>,
}

impl EmptyBitmapChunk {
    pub fn end_of_array(meta: ChunkMeta) -> Self {
        Self {
            meta,
            layout: None,
            geometry: None,
            cursor: BitmapCursor::first(&[]),
            coords: Vec::new(),
        }
    }

    pub fn decode(
        meta: ChunkMeta,
        payload: Bytes,
        dimensions: &[Dimension],
        options: DecoderOptions,
    ) -> Result<Self, ClientError> {
        if meta.eof {
            return Ok(Self::end_of_array(meta));
        }
        if meta.compression_method != 0 {
            return Err(DecodeError::UnsupportedCompression(meta.compression_method).into());
        }

        let layout = BitmapLayout::parse(&payload, options)?;
        let geometry = TileGeometry::new(dimensions, &meta.coordinates)?;
        if layout.logical_end() > geometry.cell_count() {
            return Err(DecodeError::Malformed(format!(
                "bitmap reaches logical position {} but its tile has {} cells",
                layout.logical_end(),
                geometry.cell_count()
            ))
            .into());
        }
        debug!(
            target: "scidb_client::chunk",
            segments = layout.segments.len(),
            present = layout.n_non_empty,
            "decoded empty bitmap at {:?}",
            meta.coordinates
        );

        let cursor = BitmapCursor::first(&layout.segments);
        let mut chunk = Self {
            coords: vec![0; dimensions.len()],
            meta,
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

    pub fn present_cells(&self) -> u64 {
        self.layout.as_ref().map(|l| l.n_non_empty).unwrap_or(0)
    }

    /// Logical position of the current present cell inside the tile.
    pub fn logical_position(&self) -> u64 {
        self.cursor.logical
    }

    fn refresh_coordinates(&mut self) {
        if self.cursor.end {
            return;
        }
        if let Some(geometry) = &self.geometry {
            geometry.coordinates_into(self.cursor.logical, &mut self.coords);
        }
    }
}

impl CellIterator for EmptyBitmapChunk {
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
        probe.advance(layout)
    }

    fn advance(&mut self) -> bool {
        let moved = match &self.layout {
            Some(layout) => self.cursor.advance(layout),
            None => false,
        };
        if moved {
            self.refresh_coordinates();
        }
        moved
    }

    /// Ordinal of the current present cell, matching the value chunks' positions.
    fn position(&self) -> u64 {
        self.cursor.visited
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
