pub mod connection;
pub mod driver;
pub mod metadata;
pub mod result_set;
pub mod statement;
pub mod url;
pub mod value;

pub use connection::{SharedConnection, SqlConnection};
pub use driver::Driver;
pub use metadata::{ColumnIndex, ColumnInfo, ColumnSource, ResultSetMetadata};
pub use result_set::ResultSet;
pub use statement::{SUCCESS_NO_INFO, Statement};
pub use url::{ConnectionUrl, DEFAULT_PORT};
pub use value::SqlValue;

#[cfg(test)]
mod url_test;
