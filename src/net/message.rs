use std::io::{Read, Write};

use bytes::Bytes;
use prost::Message;
use tracing::debug;

use crate::errors::{ClientError, ProtocolError};
use crate::net::header::MessageHeader;
use crate::net::message_type::MessageType;
use crate::net::records::{ChunkRecord, ErrorRecord, FetchRecord, QueryRecord, QueryResultRecord};
use crate::net::stream::read_section;

/// Messages the client sends.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    PrepareQuery { query: String, afl: bool },
    ExecuteQuery {
        query_id: u64,
        query: String,
        afl: bool,
    },
    Fetch {
        query_id: u64,
        attribute_id: u32,
        array_name: String,
    },
    CompleteQuery { query_id: u64 },
    CancelQuery { query_id: u64 },
}

impl Request {
    pub fn message_type(&self) -> MessageType {
        match self {
            Request::PrepareQuery { .. } => MessageType::PrepareQuery,
            Request::ExecuteQuery { .. } => MessageType::ExecuteQuery,
            Request::Fetch { .. } => MessageType::Fetch,
            Request::CompleteQuery { .. } => MessageType::CompleteQuery,
            Request::CancelQuery { .. } => MessageType::CancelQuery,
        }
    }

    pub fn query_id(&self) -> u64 {
        match self {
            Request::PrepareQuery { .. } => 0,
            Request::ExecuteQuery { query_id, .. }
            | Request::Fetch { query_id, .. }
            | Request::CompleteQuery { query_id }
            | Request::CancelQuery { query_id } => *query_id,
        }
    }

    fn encode_record(&self) -> Vec<u8> {
        match self {
            Request::PrepareQuery { query, afl } | Request::ExecuteQuery { query, afl, .. } => {
                QueryRecord {
                    query: query.clone(),
                    afl: *afl,
                    program_options: String::new(),
                }
                .encode_to_vec()
            }
            Request::Fetch {
                attribute_id,
                array_name,
                ..
            } => FetchRecord {
                attribute_id: *attribute_id,
                array_name: array_name.clone(),
            }
            .encode_to_vec(),
            Request::CompleteQuery { .. } | Request::CancelQuery { .. } => Vec::new(),
        }
    }

    /// Serializes header and record into one frame and writes it.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), ClientError> {
        let record = self.encode_record();
        let mut header = MessageHeader::new(self.message_type(), self.query_id());
        header.record_size = record.len() as u32;

        let mut frame = Vec::with_capacity(MessageHeader::LEN + record.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(&record);
        w.write_all(&frame)?;
        w.flush()?;
        debug!(
            target: "scidb_client::net",
            "sent {:?} query_id={} record_size={}",
            self.message_type(),
            header.query_id,
            header.record_size
        );
        Ok(())
    }
}

/// Messages the client accepts.
#[derive(Debug, Clone)]
pub enum Response {
    QueryResult {
        header: MessageHeader,
        record: QueryResultRecord,
    },
    Error {
        header: MessageHeader,
        record: ErrorRecord,
    },
    Chunk {
        header: MessageHeader,
        record: ChunkRecord,
        payload: Bytes,
    },
}

impl Response {
    pub fn header(&self) -> &MessageHeader {
        match self {
            Response::QueryResult { header, .. }
            | Response::Error { header, .. }
            | Response::Chunk { header, .. } => header,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Response::QueryResult { .. } => MessageType::QueryResult,
            Response::Error { .. } => MessageType::Error,
            Response::Chunk { .. } => MessageType::Chunk,
        }
    }

    /// Reads one complete frame: header, record, then binary payload.
    pub fn read_from<R: Read + ?Sized>(r: &mut R) -> Result<Self, ClientError> {
        let header = MessageHeader::read_from(r)?;
        header.check_version()?;
        let kind = header.kind()?;
        if !kind.is_client_inbound() {
            return Err(ProtocolError::UnknownMessageType(header.message_type).into());
        }

        let record = read_section(r, "record", header.record_size as usize)?;
        let payload = read_section(r, "binary", header.binary_size as usize)?;
        debug!(
            target: "scidb_client::net",
            "received {:?} query_id={} record_size={} binary_size={}",
            kind,
            header.query_id,
            header.record_size,
            header.binary_size
        );

        if kind != MessageType::Chunk && !payload.is_empty() {
            return Err(ProtocolError::UnexpectedPayload {
                message_type: kind,
                size: header.binary_size,
            }
            .into());
        }

        let response = match kind {
            MessageType::QueryResult => Response::QueryResult {
                header,
                record: QueryResultRecord::decode(record.as_slice())
                    .map_err(ProtocolError::Record)?,
            },
            MessageType::Error => Response::Error {
                header,
                record: ErrorRecord::decode(record.as_slice()).map_err(ProtocolError::Record)?,
            },
            _ => Response::Chunk {
                header,
                record: ChunkRecord::decode(record.as_slice()).map_err(ProtocolError::Record)?,
                payload: Bytes::from(payload),
            },
        };
        Ok(response)
    }

    /// Frames a response the way the server does. Used by test servers.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        let (record, payload): (Vec<u8>, &[u8]) = match self {
            Response::QueryResult { record, .. } => (record.encode_to_vec(), &[]),
            Response::Error { record, .. } => (record.encode_to_vec(), &[]),
            Response::Chunk {
                record, payload, ..
            } => (record.encode_to_vec(), payload.as_ref()),
        };
        let mut header = *self.header();
        header.message_type = self.message_type().code();
        header.record_size = record.len() as u32;
        header.binary_size = payload.len() as u32;
        header.write_to(w)?;
        w.write_all(&record)?;
        w.write_all(payload)?;
        w.flush()
    }
}

/// Reads one request frame as the server would see it.
pub fn read_request<R: Read + ?Sized>(r: &mut R) -> Result<Request, ClientError> {
    let header = MessageHeader::read_from(r)?;
    header.check_version()?;
    let record = read_section(r, "record", header.record_size as usize)?;
    let query_id = header.query_id;
    let request = match header.kind()? {
        MessageType::PrepareQuery => {
            let rec = QueryRecord::decode(record.as_slice()).map_err(ProtocolError::Record)?;
            Request::PrepareQuery {
                query: rec.query,
                afl: rec.afl,
            }
        }
        MessageType::ExecuteQuery => {
            let rec = QueryRecord::decode(record.as_slice()).map_err(ProtocolError::Record)?;
            Request::ExecuteQuery {
                query_id,
                query: rec.query,
                afl: rec.afl,
            }
        }
        MessageType::Fetch => {
            let rec = FetchRecord::decode(record.as_slice()).map_err(ProtocolError::Record)?;
            Request::Fetch {
                query_id,
                attribute_id: rec.attribute_id,
                array_name: rec.array_name,
            }
        }
        MessageType::CompleteQuery => Request::CompleteQuery { query_id },
        MessageType::CancelQuery => Request::CancelQuery { query_id },
        _ => return Err(ProtocolError::UnknownMessageType(header.message_type).into()),
    };
    Ok(request)
}
