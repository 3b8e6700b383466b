use bytes::Bytes;

use crate::chunk::ChunkMeta;
use crate::errors::ClientError;
use crate::net::records::ChunkRecord;
use crate::schema::ArraySchema;

/// Handle to the result array of an executed selective query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultArray {
    pub query_id: u64,
    pub schema: ArraySchema,
}

impl ResultArray {
    pub fn new(query_id: u64, schema: ArraySchema) -> Self {
        Self { query_id, schema }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

/// One chunk as received: metadata plus undecoded payload.
#[derive(Debug, Clone)]
pub struct RawChunk {
    pub meta: ChunkMeta,
    pub payload: Bytes,
}

impl RawChunk {
    pub fn new(record: &ChunkRecord, payload: Bytes) -> Self {
        Self {
            meta: ChunkMeta::from(record),
            payload,
        }
    }
}

/// Anything that can hand out the next chunk of one attribute of an array.
pub trait ChunkSource {
    fn fetch(&mut self, array: &ResultArray, attribute_id: u32) -> Result<RawChunk, ClientError>;
}

impl<T: ChunkSource + ?Sized> ChunkSource for &mut T {
    fn fetch(&mut self, array: &ResultArray, attribute_id: u32) -> Result<RawChunk, ClientError> {
        (**self).fetch(array, attribute_id)
    }
}
