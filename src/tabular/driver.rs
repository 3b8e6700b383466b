use std::net::TcpStream;

use tracing::info;

use crate::client::{Connection, ConnectionOptions};
use crate::errors::ClientError;
use crate::tabular::connection::SqlConnection;
use crate::tabular::url::ConnectionUrl;

/// Entry point of the tabular interface.
pub struct Driver;

impl Driver {
    pub fn accepts_url(url: &str) -> bool {
        ConnectionUrl::accepts(url)
    }

    pub fn connect(
        url: &str,
        options: &ConnectionOptions,
    ) -> Result<SqlConnection<TcpStream>, ClientError> {
        let target = ConnectionUrl::parse(url)?;
        info!(
            target: "scidb_client::tabular",
            "connecting to {}:{}", target.host, target.port
        );
        let connection = Connection::connect(&target.host, target.port, options)?;
        Ok(SqlConnection::new(connection))
    }
}
