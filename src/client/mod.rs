pub mod array;
pub mod connection;
pub mod cursor;
pub mod query_result;

pub use array::{ChunkSource, RawChunk, ResultArray};
pub use connection::{Connection, ConnectionOptions, WarningCallback};
pub use cursor::ArrayCursor;
pub use query_result::{QueryResult, Warning};
