use bytes::Bytes;
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::chunk::ChunkMeta;
use crate::client::RawChunk;
use crate::net::Response;
use crate::net::records::ChunkRecord;
use crate::test_helpers::factories::ResponseFactory;

pub struct ChunkFactory {
    params: HashMap<String, Value>,
    payload: Bytes,
}

impl ChunkFactory {
    pub fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("attribute_id".into(), json!(0));
        params.insert("array_id".into(), json!(1));
        params.insert("coordinates".into(), json!([0]));
        params.insert("eof".into(), json!(false));
        params.insert("compression_method".into(), json!(0));
        Self {
            params,
            payload: Bytes::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_attribute(self, attribute_id: u32) -> Self {
        self.with("attribute_id", attribute_id)
    }

    pub fn with_coordinates(self, coordinates: &[i64]) -> Self {
        self.with("coordinates", json!(coordinates))
    }

    pub fn with_compression(self, method: u32) -> Self {
        self.with("compression_method", method)
    }

    pub fn with_payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    /// End-of-array sentinel: no coordinates, no payload.
    pub fn eof(mut self) -> Self {
        self.payload = Bytes::new();
        self.with("eof", true).with("coordinates", json!([]))
    }

    pub fn create_record(&self) -> ChunkRecord {
        let coordinates = self.params["coordinates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_i64().unwrap())
            .collect();
        ChunkRecord {
            compression_method: self.params["compression_method"].as_u64().unwrap() as u32,
            attribute_id: self.params["attribute_id"].as_u64().unwrap() as u32,
            count: 0,
            coordinates,
            eof: self.params["eof"].as_bool().unwrap(),
            decompressed_size: self.payload.len() as u64,
            array_id: self.params["array_id"].as_u64().unwrap(),
            warnings: Vec::new(),
        }
    }

    pub fn create_meta(&self) -> ChunkMeta {
        ChunkMeta::from(&self.create_record())
    }

    pub fn create(self) -> RawChunk {
        RawChunk::new(&self.create_record(), self.payload)
    }

    /// The chunk as the server frames it.
    pub fn create_response(self, query_id: u64) -> Response {
        ResponseFactory::chunk(query_id, self.create_record(), self.payload)
    }
}
