use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

/// A cell value of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Datetime(DateTime<Utc>),
    DatetimeTz(DateTime<FixedOffset>),
    Binary(Vec<u8>),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Bool(v) => write!(f, "{}", v),
            SqlValue::Char(v) => write!(f, "'{}'", v),
            SqlValue::Int8(v) => write!(f, "{}", v),
            SqlValue::Int16(v) => write!(f, "{}", v),
            SqlValue::Int32(v) => write!(f, "{}", v),
            SqlValue::Int64(v) => write!(f, "{}", v),
            SqlValue::Uint8(v) => write!(f, "{}", v),
            SqlValue::Uint16(v) => write!(f, "{}", v),
            SqlValue::Uint32(v) => write!(f, "{}", v),
            SqlValue::Uint64(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Double(v) => write!(f, "{}", v),
            SqlValue::String(v) => write!(f, "'{}'", v),
            SqlValue::Datetime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            SqlValue::DatetimeTz(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S %:z")),
            SqlValue::Binary(v) => write!(f, "<binary {} bytes>", v.len()),
        }
    }
}
