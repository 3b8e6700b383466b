use bytes::Bytes;

use crate::chunk::format::{RunKind, VALUE_PAYLOAD_MAGIC, ValuePayloadHeader};

/// Builds RLE value payloads run by run.
pub struct ValuePayloadFactory {
    magic: u64,
    elem_size: u64,
    is_boolean: bool,
    runs: Vec<(u64, RunKind)>,
    data: Vec<u8>,
    var_data: Vec<u8>,
}

impl ValuePayloadFactory {
    pub fn new() -> Self {
        Self {
            magic: VALUE_PAYLOAD_MAGIC,
            elem_size: 4,
            is_boolean: false,
            runs: Vec::new(),
            data: Vec::new(),
            var_data: Vec::new(),
        }
    }

    pub fn with_magic(mut self, magic: u64) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_elem_size(mut self, elem_size: u64) -> Self {
        self.elem_size = elem_size;
        self
    }

    pub fn with_boolean(mut self) -> Self {
        self.is_boolean = true;
        self.elem_size = 1;
        self
    }

    pub fn literal(mut self, len: u64, base: u32) -> Self {
        self.runs.push((len, RunKind::Literal { base }));
        self
    }

    pub fn repeated(mut self, len: u64, value_index: u32) -> Self {
        self.runs.push((len, RunKind::Repeated { value_index }));
        self
    }

    pub fn nulls(mut self, len: u64, missing_reason: u32) -> Self {
        self.runs.push((len, RunKind::Nulls { missing_reason }));
        self
    }

    pub fn with_data(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn with_var_data(mut self, bytes: &[u8]) -> Self {
        self.var_data.extend_from_slice(bytes);
        self
    }

    /// One literal run over the given values.
    pub fn int32s(values: &[i32]) -> Self {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new()
            .with_elem_size(4)
            .literal(values.len() as u64, 0)
            .with_data(&data)
    }

    pub fn int64s(values: &[i64]) -> Self {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new()
            .with_elem_size(8)
            .literal(values.len() as u64, 0)
            .with_data(&data)
    }

    pub fn doubles(values: &[f64]) -> Self {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new()
            .with_elem_size(8)
            .literal(values.len() as u64, 0)
            .with_data(&data)
    }

    /// One literal run of variable-length strings, short or long encoded
    /// depending on their length.
    pub fn strings(values: &[&str]) -> Self {
        let mut factory = Self::new().with_elem_size(0).literal(values.len() as u64, 0);
        for value in values {
            let offset = factory.var_data.len() as u32;
            factory.data.extend_from_slice(&offset.to_le_bytes());
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            factory.var_data.extend(encode_var(&bytes));
        }
        factory
    }

    pub fn create(self) -> Bytes {
        let header = ValuePayloadHeader {
            magic: self.magic,
            n_segs: self.runs.len() as u64,
            elem_size: self.elem_size,
            data_size: (self.data.len() + self.var_data.len()) as u64,
            var_offs: self.data.len() as u64,
            is_boolean: self.is_boolean,
        };
        let mut out = Vec::new();
        header.write_to(&mut out);

        let mut position = 0u64;
        for (len, kind) in &self.runs {
            out.extend_from_slice(&(position as i64).to_le_bytes());
            out.extend_from_slice(&kind.packed().to_le_bytes());
            position += len;
        }
        out.extend_from_slice(&(position as i64).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.var_data);
        Bytes::from(out)
    }
}

/// Length-prefixed var value: one length byte when it fits, else a zero
/// byte followed by a u32 length.
pub fn encode_var(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 5);
    if !bytes.is_empty() && bytes.len() <= u8::MAX as usize {
        out.push(bytes.len() as u8);
    } else {
        out.push(0);
        out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(bytes);
    out
}
