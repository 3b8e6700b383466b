pub mod global;
pub mod model;

pub use global::CONFIG;
pub use model::{ConnectionConfig, LoggingConfig, ProtocolConfig, Settings, load_settings};
