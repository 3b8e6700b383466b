use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::Bytes;

use crate::errors::{ClientError, ProtocolError};
use crate::test_helpers::factories::ChunkFactory;
use crate::net::message::read_request;
use crate::net::records::{ChunkRecord, ErrorRecord, QueryResultRecord};
use crate::net::{MessageHeader, MessageType, Request, Response, Transport};

/// In-memory transport replaying canned server frames and capturing what
/// the client writes.
pub struct ScriptedTransport {
    input: Vec<u8>,
    read_pos: usize,
    pub output: Vec<u8>,
    pub timeout: Option<Duration>,
    pub shut_down: bool,
}

impl ScriptedTransport {
    /// Decodes every request the client sent so far.
    pub fn sent_requests(&self) -> Vec<Request> {
        let mut reader = self.output.as_slice();
        let mut requests = Vec::new();
        loop {
            match read_request(&mut reader) {
                Ok(request) => requests.push(request),
                Err(ClientError::Protocol(ProtocolError::ConnectionClosed)) => break,
                Err(e) => panic!("client wrote a malformed frame: {}", e),
            }
        }
        requests
    }

    pub fn unread(&self) -> usize {
        self.input.len() - self.read_pos
    }
}

impl Read for ScriptedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = &self.input[self.read_pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl Write for ScriptedTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for ScriptedTransport {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn timeout(&self) -> io::Result<Option<Duration>> {
        Ok(self.timeout)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.shut_down = true;
        Ok(())
    }
}

pub struct ScriptedTransportFactory {
    input: Vec<u8>,
}

impl ScriptedTransportFactory {
    pub fn new() -> Self {
        Self { input: Vec::new() }
    }

    pub fn respond(mut self, response: Response) -> Self {
        response
            .write_to(&mut self.input)
            .expect("writing to a Vec cannot fail");
        self
    }

    pub fn respond_raw(mut self, bytes: &[u8]) -> Self {
        self.input.extend_from_slice(bytes);
        self
    }

    pub fn query_result(self, query_id: u64, record: QueryResultRecord) -> Self {
        self.respond(ResponseFactory::query_result(query_id, record))
    }

    pub fn error(self, query_id: u64, code: i32, message: &str) -> Self {
        self.respond(ResponseFactory::error(query_id, code, message))
    }

    pub fn chunk(self, query_id: u64, record: ChunkRecord, payload: Bytes) -> Self {
        self.respond(ResponseFactory::chunk(query_id, record, payload))
    }

    /// Full server side of one selective query: prepare and execute
    /// replies, the given tiles in fetch order, then end-of-array chunks.
    pub fn selective_query(
        self,
        query_id: u64,
        record: QueryResultRecord,
        tiles: Vec<Vec<ChunkFactory>>,
    ) -> Self {
        let attributes = record.attributes.len() as u32;
        let mut factory = self
            .query_result(query_id, record.clone())
            .query_result(query_id, record);
        for chunk in tiles.into_iter().flatten() {
            factory = factory.respond(chunk.create_response(query_id));
        }
        for attribute_id in 0..attributes {
            let eof = ChunkFactory::new().with_attribute(attribute_id).eof();
            factory = factory.respond(eof.create_response(query_id));
        }
        factory
    }

    pub fn create(self) -> ScriptedTransport {
        ScriptedTransport {
            input: self.input,
            read_pos: 0,
            output: Vec::new(),
            timeout: None,
            shut_down: false,
        }
    }
}

/// Server-side frames.
pub struct ResponseFactory;

impl ResponseFactory {
    pub fn query_result(query_id: u64, record: QueryResultRecord) -> Response {
        Response::QueryResult {
            header: MessageHeader::new(MessageType::QueryResult, query_id),
            record,
        }
    }

    /// Code 0 is the server's plain acknowledgement.
    pub fn error(query_id: u64, code: i32, message: &str) -> Response {
        Response::Error {
            header: MessageHeader::new(MessageType::Error, query_id),
            record: ErrorRecord {
                long_error_code: code,
                short_error_code: code,
                what_str: message.into(),
                ..Default::default()
            },
        }
    }

    pub fn chunk(query_id: u64, record: ChunkRecord, payload: Bytes) -> Response {
        Response::Chunk {
            header: MessageHeader::new(MessageType::Chunk, query_id),
            record,
            payload,
        }
    }
}
