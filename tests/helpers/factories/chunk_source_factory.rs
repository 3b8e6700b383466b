use std::collections::{HashMap, VecDeque};

use crate::client::{ChunkSource, RawChunk, ResultArray};
use crate::errors::ClientError;
use crate::test_helpers::factories::ChunkFactory;

/// In-memory chunk server: hands out queued chunks per attribute, then
/// end-of-array chunks forever.
pub struct MemoryChunkSource {
    queues: HashMap<u32, VecDeque<RawChunk>>,
    pub fetches: Vec<u32>,
}

impl ChunkSource for MemoryChunkSource {
    fn fetch(&mut self, _array: &ResultArray, attribute_id: u32) -> Result<RawChunk, ClientError> {
        self.fetches.push(attribute_id);
        let next = self
            .queues
            .get_mut(&attribute_id)
            .and_then(|queue| queue.pop_front());
        Ok(next.unwrap_or_else(|| ChunkFactory::new().with_attribute(attribute_id).eof().create()))
    }
}

pub struct ChunkSourceFactory {
    tiles: Vec<Vec<RawChunk>>,
}

impl ChunkSourceFactory {
    pub fn new() -> Self {
        Self { tiles: Vec::new() }
    }

    /// Queues one chunk per attribute for the next tile.
    pub fn with_tile(mut self, chunks: Vec<RawChunk>) -> Self {
        self.tiles.push(chunks);
        self
    }

    pub fn create(self) -> MemoryChunkSource {
        let mut queues: HashMap<u32, VecDeque<RawChunk>> = HashMap::new();
        for tile in self.tiles {
            for chunk in tile {
                queues
                    .entry(chunk.meta.attribute_id)
                    .or_default()
                    .push_back(chunk);
            }
        }
        MemoryChunkSource {
            queues,
            fetches: Vec::new(),
        }
    }
}
