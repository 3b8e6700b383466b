use std::cell::{Ref, RefCell, RefMut};
use std::net::TcpStream;
use std::rc::Rc;
use std::time::Duration;

use crate::client::{ChunkSource, Connection, RawChunk, ResultArray, Warning};
use crate::errors::{ClientError, UsageError};
use crate::net::Transport;
use crate::tabular::statement::Statement;

/// A connection handle shared by statements and their result sets.
pub struct SharedConnection<T: Transport = TcpStream>(Rc<RefCell<Connection<T>>>);

impl<T: Transport> Clone for SharedConnection<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Transport> SharedConnection<T> {
    pub fn new(connection: Connection<T>) -> Self {
        Self(Rc::new(RefCell::new(connection)))
    }

    pub fn borrow(&self) -> Result<Ref<'_, Connection<T>>, ClientError> {
        self.0
            .try_borrow()
            .map_err(|_| ClientError::Usage(UsageError::ConnectionBusy))
    }

    pub fn borrow_mut(&self) -> Result<RefMut<'_, Connection<T>>, ClientError> {
        self.0
            .try_borrow_mut()
            .map_err(|_| ClientError::Usage(UsageError::ConnectionBusy))
    }
}

impl<T: Transport> ChunkSource for SharedConnection<T> {
    fn fetch(&mut self, array: &ResultArray, attribute_id: u32) -> Result<RawChunk, ClientError> {
        self.borrow_mut()?.fetch_chunk(array, attribute_id)
    }
}

/// Tabular session over one driver connection.
pub struct SqlConnection<T: Transport = TcpStream> {
    shared: SharedConnection<T>,
}

impl<T: Transport> SqlConnection<T> {
    pub fn new(connection: Connection<T>) -> Self {
        Self {
            shared: SharedConnection::new(connection),
        }
    }

    /// New statements start in the connection's current query language.
    pub fn create_statement(&self) -> Result<Statement<T>, ClientError> {
        if self.is_closed()? {
            return Err(UsageError::ConnectionClosed.into());
        }
        let afl = self.shared.borrow_mut()?.is_afl();
        Ok(Statement::new(self.shared.clone(), afl))
    }

    pub fn commit(&self) -> Result<(), ClientError> {
        self.shared.borrow_mut()?.commit()
    }

    pub fn rollback(&self) -> Result<(), ClientError> {
        self.shared.borrow_mut()?.rollback()
    }

    pub fn close(&self) -> Result<(), ClientError> {
        self.shared.borrow_mut()?.close()
    }

    /// Fails with `ConnectionBusy` while a fetch holds the connection.
    pub fn is_closed(&self) -> Result<bool, ClientError> {
        Ok(self.shared.borrow()?.is_closed())
    }

    pub fn set_afl(&self, afl: bool) -> Result<(), ClientError> {
        self.shared.borrow_mut()?.set_afl(afl);
        Ok(())
    }

    pub fn is_afl(&self) -> Result<bool, ClientError> {
        Ok(self.shared.borrow_mut()?.is_afl())
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<(), ClientError> {
        self.shared.borrow_mut()?.set_timeout(timeout)
    }

    pub fn set_warning_callback<F>(&self, callback: F) -> Result<(), ClientError>
    where
        F: FnMut(&Warning) + Send + 'static,
    {
        self.shared.borrow_mut()?.set_warning_callback(callback);
        Ok(())
    }

    /// Direct access to the underlying driver connection.
    pub fn connection(&self) -> Result<RefMut<'_, Connection<T>>, ClientError> {
        self.shared.borrow_mut()
    }
}
