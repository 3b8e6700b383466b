use crate::errors::ProtocolError;

/// Message type codes shared with the server.
///
/// The server defines the whole table; the client produces `PrepareQuery`,
/// `ExecuteQuery`, `Fetch`, `CompleteQuery` and `CancelQuery`, and accepts
/// `QueryResult`, `Error` and `Chunk`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    None = 0,
    ExecuteQuery = 1,
    PreparePhysicalPlan = 2,
    ExecutePhysicalPlan = 3,
    Fetch = 4,
    Chunk = 5,
    ChunkReplica = 6,
    RecoverChunk = 7,
    ReplicaSyncRequest = 8,
    ReplicaSyncResponse = 9,
    AggregateChunk = 10,
    QueryResult = 11,
    Error = 12,
    SyncRequest = 13,
    SyncResponse = 14,
    CancelQuery = 15,
    RemoteChunk = 16,
    Notify = 17,
    Wait = 18,
    Barrier = 19,
    MpiSend = 20,
    Alive = 21,
    PrepareQuery = 22,
    ResourcesFileExistsRequest = 23,
    ResourcesFileExistsResponse = 24,
    Abort = 25,
    Commit = 26,
    CompleteQuery = 27,
    Control = 28,
    SystemMax = 29,
}

impl MessageType {
    const ALL: [MessageType; 30] = [
        MessageType::None,
        MessageType::ExecuteQuery,
        MessageType::PreparePhysicalPlan,
        MessageType::ExecutePhysicalPlan,
        MessageType::Fetch,
        MessageType::Chunk,
        MessageType::ChunkReplica,
        MessageType::RecoverChunk,
        MessageType::ReplicaSyncRequest,
        MessageType::ReplicaSyncResponse,
        MessageType::AggregateChunk,
        MessageType::QueryResult,
        MessageType::Error,
        MessageType::SyncRequest,
        MessageType::SyncResponse,
        MessageType::CancelQuery,
        MessageType::RemoteChunk,
        MessageType::Notify,
        MessageType::Wait,
        MessageType::Barrier,
        MessageType::MpiSend,
        MessageType::Alive,
        MessageType::PrepareQuery,
        MessageType::ResourcesFileExistsRequest,
        MessageType::ResourcesFileExistsResponse,
        MessageType::Abort,
        MessageType::Commit,
        MessageType::CompleteQuery,
        MessageType::Control,
        MessageType::SystemMax,
    ];

    pub fn from_code(code: u16) -> Result<Self, ProtocolError> {
        MessageType::ALL
            .get(code as usize)
            .copied()
            .ok_or(ProtocolError::UnknownMessageType(code))
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether the client knows how to handle this type when it arrives.
    pub fn is_client_inbound(self) -> bool {
        matches!(
            self,
            MessageType::QueryResult | MessageType::Error | MessageType::Chunk
        )
    }
}
