pub use super::factories::{
    BitmapPayloadFactory, ChunkFactory, ChunkSourceFactory, ResponseFactory, SchemaFactory,
    ScriptedTransportFactory, ValuePayloadFactory,
};

pub struct Factory;

impl Factory {
    pub fn schema() -> SchemaFactory {
        SchemaFactory::new()
    }

    pub fn value_payload() -> ValuePayloadFactory {
        ValuePayloadFactory::new()
    }

    pub fn bitmap_payload() -> BitmapPayloadFactory {
        BitmapPayloadFactory::new()
    }

    pub fn chunk() -> ChunkFactory {
        ChunkFactory::new()
    }

    pub fn chunk_source() -> ChunkSourceFactory {
        ChunkSourceFactory::new()
    }

    pub fn scripted_transport() -> ScriptedTransportFactory {
        ScriptedTransportFactory::new()
    }
}
