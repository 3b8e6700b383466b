pub mod bitmap_chunk;
pub mod format;
pub mod geometry;
pub mod reader;
pub mod value_chunk;

pub use bitmap_chunk::EmptyBitmapChunk;
pub use format::DecoderOptions;
pub use geometry::TileGeometry;
pub use value_chunk::ValueChunk;

use crate::errors::DecodeError;
use crate::net::records::ChunkRecord;

/// Per-chunk metadata carried in the chunk record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkMeta {
    pub attribute_id: u32,
    pub array_id: u64,
    pub eof: bool,
    pub coordinates: Vec<i64>,
    pub compression_method: u32,
    pub count: u64,
}

impl From<&ChunkRecord> for ChunkMeta {
    fn from(rec: &ChunkRecord) -> Self {
        Self {
            attribute_id: rec.attribute_id,
            array_id: rec.array_id,
            eof: rec.eof,
            coordinates: rec.coordinates.clone(),
            compression_method: rec.compression_method,
            count: rec.count,
        }
    }
}

/// Forward-only walk over the cells of one chunk.
pub trait CellIterator {
    fn attribute_id(&self) -> u32;

    /// The chunk was the end-of-array sentinel.
    fn end_of_array(&self) -> bool;

    fn end_of_chunk(&self) -> bool;

    /// Probes one step ahead without moving.
    fn has_next(&self) -> bool;

    /// Steps to the next cell; false once the chunk is exhausted.
    fn advance(&mut self) -> bool;

    /// Ordinal of the current cell among the cells stored in the chunk.
    fn position(&self) -> u64;

    /// Coordinates of the current cell, valid until the next advance.
    fn coordinates(&self) -> Result<&[i64], DecodeError>;
}

#[cfg(test)]
mod bitmap_chunk_test;
#[cfg(test)]
mod geometry_test;
