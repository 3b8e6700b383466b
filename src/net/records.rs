//! Structured records carried between the header and the binary payload.

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct QueryRecord {
    #[prost(string, tag = "1")]
    pub query: String,
    #[prost(bool, tag = "2")]
    pub afl: bool,
    #[prost(string, tag = "3")]
    pub program_options: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct FetchRecord {
    #[prost(uint32, tag = "1")]
    pub attribute_id: u32,
    #[prost(string, tag = "2")]
    pub array_name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct AttributeDescRecord {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub type_id: String,
    #[prost(uint32, tag = "4")]
    pub flags: u32,
    #[prost(uint32, tag = "5")]
    pub default_compression_method: u32,
    #[prost(int32, tag = "6")]
    pub default_missing_reason: i32,
    #[prost(bytes = "vec", tag = "7")]
    pub default_value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DimensionDescRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int64, tag = "2")]
    pub start_min: i64,
    #[prost(int64, tag = "3")]
    pub curr_start: i64,
    #[prost(int64, tag = "4")]
    pub curr_end: i64,
    #[prost(int64, tag = "5")]
    pub end_max: i64,
    #[prost(int64, tag = "6")]
    pub chunk_interval: i64,
    #[prost(int64, tag = "7")]
    pub chunk_overlap: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct WarningRecord {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub file: String,
    #[prost(string, tag = "3")]
    pub function: String,
    #[prost(int32, tag = "4")]
    pub line: i32,
    #[prost(string, tag = "5")]
    pub what_str: String,
    #[prost(string, tag = "6")]
    pub strings_namespace: String,
    #[prost(string, tag = "7")]
    pub stringified_code: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryResultRecord {
    #[prost(bool, tag = "1")]
    pub selective: bool,
    #[prost(string, tag = "2")]
    pub array_name: String,
    #[prost(message, repeated, tag = "3")]
    pub attributes: Vec<AttributeDescRecord>,
    #[prost(message, repeated, tag = "4")]
    pub dimensions: Vec<DimensionDescRecord>,
    #[prost(string, tag = "5")]
    pub explain_logical: String,
    #[prost(string, tag = "6")]
    pub explain_physical: String,
    #[prost(message, repeated, tag = "7")]
    pub warnings: Vec<WarningRecord>,
    #[prost(uint64, tag = "8")]
    pub execution_time: u64,
    #[prost(bool, tag = "9")]
    pub exclusive_array_access: bool,
    #[prost(string, repeated, tag = "10")]
    pub plugins: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ErrorRecord {
    #[prost(string, tag = "1")]
    pub errors_namespace: String,
    #[prost(int32, tag = "2")]
    pub short_error_code: i32,
    #[prost(int32, tag = "3")]
    pub long_error_code: i32,
    #[prost(string, tag = "4")]
    pub what_str: String,
    #[prost(string, tag = "5")]
    pub stringified_short_error_code: String,
    #[prost(string, tag = "6")]
    pub stringified_long_error_code: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChunkRecord {
    #[prost(uint32, tag = "1")]
    pub compression_method: u32,
    #[prost(uint32, tag = "2")]
    pub attribute_id: u32,
    #[prost(uint64, tag = "3")]
    pub count: u64,
    #[prost(int64, repeated, tag = "4")]
    pub coordinates: Vec<i64>,
    #[prost(bool, tag = "5")]
    pub eof: bool,
    #[prost(uint64, tag = "6")]
    pub decompressed_size: u64,
    #[prost(uint64, tag = "7")]
    pub array_id: u64,
    #[prost(message, repeated, tag = "8")]
    pub warnings: Vec<WarningRecord>,
}
