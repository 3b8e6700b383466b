use std::collections::VecDeque;
use std::net::TcpStream;

use tracing::debug;

use crate::errors::{ClientError, UsageError};
use crate::net::Transport;
use crate::tabular::connection::SharedConnection;
use crate::tabular::result_set::ResultSet;

/// Batch entry outcome when no row count is known.
pub const SUCCESS_NO_INFO: i32 = -2;

/// Runs queries on a shared connection and keeps their result sets.
pub struct Statement<T: Transport = TcpStream> {
    connection: SharedConnection<T>,
    afl: bool,
    batch: Vec<String>,
    results: VecDeque<ResultSet<T>>,
    closed: bool,
}

impl<T: Transport> Statement<T> {
    pub(crate) fn new(connection: SharedConnection<T>, afl: bool) -> Self {
        Self {
            connection,
            afl,
            batch: Vec::new(),
            results: VecDeque::new(),
            closed: false,
        }
    }

    pub fn set_afl(&mut self, afl: bool) {
        self.afl = afl;
    }

    pub fn is_afl(&self) -> bool {
        self.afl
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.closed {
            return Err(UsageError::ConnectionClosed.into());
        }
        Ok(())
    }

    /// Prepares and executes one query; `None` when it returns no array.
    pub fn execute_query(&mut self, query: &str) -> Result<Option<ResultSet<T>>, ClientError> {
        self.ensure_open()?;
        let array = {
            let mut conn = self.connection.borrow_mut()?;
            conn.set_afl(self.afl);
            conn.execute_query(query)?.result_array()
        };
        debug!(
            target: "scidb_client::tabular",
            "query '{}' selective={}", query, array.is_some()
        );
        match array {
            Some(array) => Ok(Some(ResultSet::open(self.connection.clone(), array)?)),
            None => Ok(None),
        }
    }

    /// Executes a query and keeps its result set for `get_result_set`.
    /// Returns whether a result set was produced.
    pub fn execute(&mut self, query: &str) -> Result<bool, ClientError> {
        self.results.clear();
        let result = self.execute_query(query)?;
        let selective = result.is_some();
        self.results.extend(result);
        Ok(selective)
    }

    pub fn add_batch(&mut self, query: impl Into<String>) {
        self.batch.push(query.into());
    }

    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Runs every queued query in order. Result sets are kept in the same
    /// order and walked with `get_result_set` / `get_more_results`.
    pub fn execute_batch(&mut self) -> Result<Vec<i32>, ClientError> {
        self.results.clear();
        let batch = std::mem::take(&mut self.batch);
        let mut counts = Vec::with_capacity(batch.len());
        for query in &batch {
            let result = self.execute_query(query)?;
            self.results.extend(result);
            counts.push(SUCCESS_NO_INFO);
        }
        Ok(counts)
    }

    pub fn get_result_set(&mut self) -> Option<&mut ResultSet<T>> {
        self.results.front_mut()
    }

    /// Drops the current result set; true if another one follows.
    pub fn get_more_results(&mut self) -> bool {
        self.results.pop_front();
        !self.results.is_empty()
    }

    /// Removes the current result set from the statement.
    pub fn take_result_set(&mut self) -> Result<ResultSet<T>, ClientError> {
        self.results
            .pop_front()
            .ok_or(ClientError::Usage(UsageError::NoResultSet))
    }

    pub fn close(&mut self) {
        self.results.clear();
        self.batch.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
