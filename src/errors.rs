use std::io;
use thiserror::Error;
use tracing::{debug, error};

use crate::net::message_type::MessageType;

/// Errors surfaced by the driver.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Server error {code}: {message}")]
    Server { code: i32, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Type {column_type} can not be converted to {requested}")]
    Type {
        column_type: String,
        requested: &'static str,
    },

    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown network message type {0}")]
    UnknownMessageType(u16),

    #[error("Protocol version mismatch: client speaks {expected}, server sent {found}")]
    VersionMismatch { expected: u16, found: u16 },

    #[error("Failed to parse record: {0}")]
    Record(#[from] prost::DecodeError),

    #[error("Truncated frame: {section} expected {expected} bytes, received {received}")]
    TruncatedFrame {
        section: &'static str,
        expected: usize,
        received: usize,
    },

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Unexpected message: expected {expected}, got {found:?}")]
    UnexpectedMessage {
        expected: &'static str,
        found: MessageType,
    },

    #[error("Bad payload magic: expected {expected:#018x}, found {found:#018x}")]
    BadMagic { expected: u64, found: u64 },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Message {message_type:?} carries an unexpected binary payload of {size} bytes")]
    UnexpectedPayload {
        message_type: MessageType,
        size: u32,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Current item is NULL (missing reason {missing_reason})")]
    NullCell { missing_reason: u32 },

    #[error("Read past the end of the chunk")]
    EndOfChunk,

    #[error("End of array reached")]
    EndOfArray,

    #[error("Read of {len} bytes at offset {offset} exceeds payload of {available} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("Malformed chunk payload: {0}")]
    Malformed(String),

    #[error("Compressed chunks not yet supported (method {0})")]
    UnsupportedCompression(u32),

    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Attribute of type {type_id} can not be read as {requested}")]
    UnsupportedType {
        type_id: String,
        requested: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Query not prepared")]
    NotPrepared,

    #[error("Cursor is exhausted")]
    CursorExhausted,

    #[error("Connection is broken: {0}")]
    ConnectionBroken(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Connection is already in use")]
    ConnectionBusy,

    #[error("Result set is closed")]
    ResultSetClosed,

    #[error("Column index {0} is out of range")]
    InvalidColumn(usize),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Query did not produce a result set")]
    NoResultSet,

    #[error("Attribute {attribute_id} of query {query_id} already reached the end of the array")]
    FetchAfterEndOfArray { query_id: u64, attribute_id: u32 },
}

impl ClientError {
    /// IO and protocol failures leave the wire in an unknown state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Io(_) | ClientError::Protocol(_))
    }

    pub fn log_error(&self) {
        match self {
            ClientError::Io(e) => {
                error!("I/O failure: {}", e);
                debug!("I/O error details: {:?}", e);
            }
            ClientError::Protocol(e) => {
                error!("Protocol failure: {}", e);
                debug!("Protocol error details: {:?}", e);
            }
            ClientError::Server { code, message } => {
                error!("Server returned error {}: {}", code, message);
            }
            ClientError::Decode(e) => {
                error!("Chunk decode failed: {}", e);
                debug!("Decode error details: {:?}", e);
            }
            ClientError::Type {
                column_type,
                requested,
            } => {
                error!("Type conversion failed: {} -> {}", column_type, requested);
            }
            ClientError::Usage(e) => {
                error!("Usage error: {}", e);
            }
        }
    }
}
