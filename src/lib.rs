pub mod chunk;
pub mod client;
pub mod errors;
pub mod logging;
pub mod net;
pub mod schema;
pub mod shared;
pub mod tabular;

pub use client::{ArrayCursor, Connection, ConnectionOptions, QueryResult, ResultArray};
pub use errors::ClientError;
pub use tabular::{Driver, ResultSet, SqlConnection, Statement};

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
