use std::collections::HashSet;
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::chunk::DecoderOptions;
use crate::client::array::{ChunkSource, RawChunk, ResultArray};
use crate::client::query_result::{QueryResult, Warning};
use crate::errors::{ClientError, ProtocolError, UsageError};
use crate::net::records::ErrorRecord;
use crate::net::transport::{Transport, connect_tcp};
use crate::net::{Request, Response};
use crate::shared::config::model::Settings;

pub type WarningCallback = Box<dyn FnMut(&Warning) + Send>;

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    pub connect_timeout: Duration,
    pub io_timeout: Option<Duration>,
    pub afl: bool,
    pub decoder: DecoderOptions,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            io_timeout: None,
            afl: false,
            decoder: DecoderOptions::default(),
        }
    }
}

impl ConnectionOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            connect_timeout: Duration::from_millis(settings.connection.connect_timeout_ms),
            io_timeout: settings.connection.read_timeout_ms.map(Duration::from_millis),
            afl: settings.connection.afl,
            decoder: DecoderOptions {
                validate_magic: settings.protocol.validate_magic,
            },
        }
    }

    pub fn with_afl(mut self, afl: bool) -> Self {
        self.afl = afl;
        self
    }

    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderOptions) -> Self {
        self.decoder = decoder;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryState {
    Idle,
    Prepared { query_id: u64, query: String },
}

/// One synchronous session with a server.
///
/// Requests and responses strictly alternate on the wire. Any I/O or
/// protocol failure leaves the session broken; later calls fail fast.
pub struct Connection<T: Transport = TcpStream> {
    transport: Option<T>,
    afl: bool,
    state: QueryState,
    active_queries: Vec<u64>,
    warning_callback: Option<WarningCallback>,
    broken: Option<String>,
    decoder: DecoderOptions,
    /// `(query_id, attribute_id)` pairs that already returned their EOF chunk.
    drained: HashSet<(u64, u32)>,
}

impl Connection<TcpStream> {
    pub fn connect(host: &str, port: u16, options: &ConnectionOptions) -> Result<Self, ClientError> {
        let stream = connect_tcp(host, port, options.connect_timeout, options.io_timeout)?;
        Ok(Connection::with_transport(stream, options))
    }
}

impl<T: Transport> Connection<T> {
    pub fn with_transport(transport: T, options: &ConnectionOptions) -> Self {
        Self {
            transport: Some(transport),
            afl: options.afl,
            state: QueryState::Idle,
            active_queries: Vec::new(),
            warning_callback: None,
            broken: None,
            decoder: options.decoder,
            drained: HashSet::new(),
        }
    }

    pub fn set_afl(&mut self, afl: bool) {
        self.afl = afl;
    }

    pub fn is_afl(&self) -> bool {
        self.afl
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        self.decoder
    }

    pub fn set_warning_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Warning) + Send + 'static,
    {
        self.warning_callback = Some(Box::new(callback));
    }

    pub fn clear_warning_callback(&mut self) {
        self.warning_callback = None;
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), ClientError> {
        self.transport()?.set_timeout(timeout)?;
        Ok(())
    }

    pub fn timeout(&mut self) -> Result<Option<Duration>, ClientError> {
        Ok(self.transport()?.timeout()?)
    }

    /// Id of the prepared query, if one awaits execution.
    pub fn query_id(&self) -> Option<u64> {
        match self.state {
            QueryState::Prepared { query_id, .. } => Some(query_id),
            QueryState::Idle => None,
        }
    }

    pub fn active_queries(&self) -> &[u64] {
        &self.active_queries
    }

    pub fn is_broken(&self) -> bool {
        self.broken.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    fn transport(&mut self) -> Result<&mut T, ClientError> {
        if let Some(reason) = &self.broken {
            return Err(UsageError::ConnectionBroken(reason.clone()).into());
        }
        self.transport
            .as_mut()
            .ok_or(ClientError::Usage(UsageError::ConnectionClosed))
    }

    /// One request/response turn. Fatal failures latch the broken state.
    fn exchange(&mut self, request: &Request) -> Result<Response, ClientError> {
        let transport = self.transport()?;
        let result = request
            .write_to(transport)
            .and_then(|_| Response::read_from(transport));
        if let Err(e) = &result {
            if e.is_fatal() {
                e.log_error();
                self.broken = Some(e.to_string());
            }
        }
        result
    }

    fn fail_protocol(&mut self, err: ProtocolError) -> ClientError {
        let err = ClientError::from(err);
        err.log_error();
        self.broken = Some(err.to_string());
        err
    }

    fn deliver_warnings(&mut self, warnings: &[Warning]) {
        for warning in warnings {
            warn!(target: "scidb_client::query", "{}", warning);
            if let Some(callback) = self.warning_callback.as_mut() {
                callback(warning);
            }
        }
    }

    fn expect_query_result(&mut self, response: Response) -> Result<QueryResult, ClientError> {
        match response {
            Response::QueryResult { header, record } => {
                let result = QueryResult::from_record(header.query_id, &record)
                    .map_err(|e| self.fail_protocol(e))?;
                self.deliver_warnings(&result.warnings);
                Ok(result)
            }
            Response::Error { record, .. } => Err(server_error(&record)),
            other => Err(self.fail_protocol(ProtocolError::UnexpectedMessage {
                expected: "QueryResult",
                found: other.message_type(),
            })),
        }
    }

    /// Sends the query text for parsing and planning; captures the query id.
    pub fn prepare(&mut self, query: &str) -> Result<QueryResult, ClientError> {
        self.state = QueryState::Idle;
        let request = Request::PrepareQuery {
            query: query.to_string(),
            afl: self.afl,
        };
        let response = self.exchange(&request)?;
        let result = self.expect_query_result(response)?;
        debug!(
            target: "scidb_client::query",
            "prepared query {} (afl={})", result.query_id, self.afl
        );
        self.state = QueryState::Prepared {
            query_id: result.query_id,
            query: query.to_string(),
        };
        Ok(result)
    }

    /// Runs the prepared query. Selective results expose their array via
    /// [`QueryResult::result_array`].
    pub fn execute(&mut self) -> Result<QueryResult, ClientError> {
        let QueryState::Prepared { query_id, query } =
            std::mem::replace(&mut self.state, QueryState::Idle)
        else {
            return Err(UsageError::NotPrepared.into());
        };
        let request = Request::ExecuteQuery {
            query_id,
            query,
            afl: self.afl,
        };
        let response = self.exchange(&request)?;
        let mut result = self.expect_query_result(response)?;
        result.query_id = query_id;
        if !self.active_queries.contains(&query_id) {
            self.active_queries.push(query_id);
        }
        self.drained.retain(|&(id, _)| id != query_id);
        info!(
            target: "scidb_client::query",
            "executed query {} (selective={}, {} ms)",
            query_id,
            result.selective,
            result.execution_time_ms
        );
        Ok(result)
    }

    /// Prepare followed by execute.
    pub fn execute_query(&mut self, query: &str) -> Result<QueryResult, ClientError> {
        self.prepare(query)?;
        self.execute()
    }

    /// Requests the next chunk of one attribute of a result array.
    pub fn fetch_chunk(
        &mut self,
        array: &ResultArray,
        attribute_id: u32,
    ) -> Result<RawChunk, ClientError> {
        if self.drained.contains(&(array.query_id, attribute_id)) {
            return Err(UsageError::FetchAfterEndOfArray {
                query_id: array.query_id,
                attribute_id,
            }
            .into());
        }
        let request = Request::Fetch {
            query_id: array.query_id,
            attribute_id,
            array_name: array.schema.name.clone(),
        };
        match self.exchange(&request)? {
            Response::Chunk {
                record, payload, ..
            } => {
                debug!(
                    target: "scidb_client::query",
                    "fetched chunk attr={} eof={} coords={:?} bytes={}",
                    record.attribute_id,
                    record.eof,
                    record.coordinates,
                    payload.len()
                );
                let warnings: Vec<Warning> = record.warnings.iter().map(Warning::from).collect();
                self.deliver_warnings(&warnings);
                if record.eof {
                    self.drained.insert((array.query_id, attribute_id));
                }
                Ok(RawChunk::new(&record, payload))
            }
            Response::Error { record, .. } => Err(server_error(&record)),
            other => Err(self.fail_protocol(ProtocolError::UnexpectedMessage {
                expected: "Chunk",
                found: other.message_type(),
            })),
        }
    }

    /// Completes every active query.
    pub fn commit(&mut self) -> Result<(), ClientError> {
        info!(target: "scidb_client::query", "commit {:?}", self.active_queries);
        self.finish_active(|query_id| Request::CompleteQuery { query_id })
    }

    /// Cancels every active query.
    pub fn rollback(&mut self) -> Result<(), ClientError> {
        info!(target: "scidb_client::query", "rollback {:?}", self.active_queries);
        self.finish_active(|query_id| Request::CancelQuery { query_id })
    }

    fn finish_active(&mut self, make: impl Fn(u64) -> Request) -> Result<(), ClientError> {
        let queries = std::mem::take(&mut self.active_queries);
        self.drained.retain(|(id, _)| !queries.contains(id));
        for query_id in queries {
            match self.exchange(&make(query_id))? {
                Response::Error { record, .. } if record.long_error_code == 0 => {}
                Response::Error { record, .. } => return Err(server_error(&record)),
                other => {
                    return Err(self.fail_protocol(ProtocolError::UnexpectedMessage {
                        expected: "Error",
                        found: other.message_type(),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Shuts the socket down. Active queries are left to the server.
    pub fn close(&mut self) -> Result<(), ClientError> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };
        if !self.active_queries.is_empty() {
            warn!(
                target: "scidb_client::query",
                "closing connection with {} active queries", self.active_queries.len()
            );
        }
        self.state = QueryState::Idle;
        self.drained.clear();
        transport.shutdown()?;
        info!(target: "scidb_client::net", "connection closed");
        Ok(())
    }
}

impl<T: Transport> ChunkSource for Connection<T> {
    fn fetch(&mut self, array: &ResultArray, attribute_id: u32) -> Result<RawChunk, ClientError> {
        self.fetch_chunk(array, attribute_id)
    }
}

fn server_error(record: &ErrorRecord) -> ClientError {
    ClientError::Server {
        code: record.long_error_code,
        message: record.what_str.clone(),
    }
}
