pub mod header;
pub mod message;
pub mod message_type;
pub mod records;
pub mod stream;
pub mod transport;

pub use header::{MessageHeader, NET_PROTOCOL_CURRENT_VER};
pub use message::{Request, Response};
pub use message_type::MessageType;
pub use transport::Transport;
