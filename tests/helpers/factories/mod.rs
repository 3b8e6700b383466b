pub mod bitmap_payload_factory;
pub mod chunk_factory;
pub mod chunk_source_factory;
pub mod schema_factory;
pub mod transport_factory;
pub mod value_payload_factory;

pub use bitmap_payload_factory::BitmapPayloadFactory;
pub use chunk_factory::ChunkFactory;
pub use chunk_source_factory::{ChunkSourceFactory, MemoryChunkSource};
pub use schema_factory::SchemaFactory;
pub use transport_factory::{ResponseFactory, ScriptedTransport, ScriptedTransportFactory};
pub use value_payload_factory::{ValuePayloadFactory, encode_var};

#[cfg(test)]
mod bitmap_payload_factory_test;
#[cfg(test)]
mod schema_factory_test;
#[cfg(test)]
mod transport_factory_test;
#[cfg(test)]
mod value_payload_factory_test;
