use std::io::{Read, Write};

use crate::errors::{ClientError, ProtocolError};
use crate::net::message_type::MessageType;
use crate::net::stream::read_fully;

/// Protocol version advertised by this client.
pub const NET_PROTOCOL_CURRENT_VER: u16 = 4;

/// Source instance id used for messages originating from a client.
pub const CLIENT_INSTANCE_ID: u64 = !0;

/// Fixed 32-byte frame header.
///
/// Layout (little-endian):
/// [version:u16][type:u16][record_size:u32][binary_size:u32][pad:4]
/// [source_instance_id:u64][query_id:u64]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub net_protocol_version: u16,
    pub message_type: u16,
    pub record_size: u32,
    pub binary_size: u32,
    pub source_instance_id: u64,
    pub query_id: u64,
}

impl MessageHeader {
    pub const LEN: usize = 32;

    pub fn new(message_type: MessageType, query_id: u64) -> Self {
        Self {
            net_protocol_version: NET_PROTOCOL_CURRENT_VER,
            message_type: message_type.code(),
            record_size: 0,
            binary_size: 0,
            source_instance_id: CLIENT_INSTANCE_ID,
            query_id,
        }
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&self.net_protocol_version.to_le_bytes());
        buf[2..4].copy_from_slice(&self.message_type.to_le_bytes());
        buf[4..8].copy_from_slice(&self.record_size.to_le_bytes());
        buf[8..12].copy_from_slice(&self.binary_size.to_le_bytes());
        // 12..16 is alignment padding, always zero
        buf[16..24].copy_from_slice(&self.source_instance_id.to_le_bytes());
        buf[24..32].copy_from_slice(&self.query_id.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; Self::LEN]) -> Self {
        let u16_at = |at: usize| u16::from_le_bytes([buf[at], buf[at + 1]]);
        let u32_at = |at: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&buf[at..at + 4]);
            u32::from_le_bytes(b)
        };
        let u64_at = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[at..at + 8]);
            u64::from_le_bytes(b)
        };
        Self {
            net_protocol_version: u16_at(0),
            message_type: u16_at(2),
            record_size: u32_at(4),
            binary_size: u32_at(8),
            source_instance_id: u64_at(16),
            query_id: u64_at(24),
        }
    }

    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&self.encode())
    }

    /// Reads one header. A stream that ends before the first byte is a
    /// closed connection; one that ends inside the header is a truncated frame.
    pub fn read_from<R: Read + ?Sized>(r: &mut R) -> Result<Self, ClientError> {
        let mut buf = [0u8; Self::LEN];
        let received = read_fully(r, &mut buf)?;
        match received {
            0 => Err(ProtocolError::ConnectionClosed.into()),
            n if n < Self::LEN => Err(ProtocolError::TruncatedFrame {
                section: "header",
                expected: Self::LEN,
                received: n,
            }
            .into()),
            _ => Ok(Self::decode(&buf)),
        }
    }

    pub fn kind(&self) -> Result<MessageType, ProtocolError> {
        MessageType::from_code(self.message_type)
    }

    pub fn check_version(&self) -> Result<(), ProtocolError> {
        if self.net_protocol_version != NET_PROTOCOL_CURRENT_VER {
            return Err(ProtocolError::VersionMismatch {
                expected: NET_PROTOCOL_CURRENT_VER,
                found: self.net_protocol_version,
            });
        }
        Ok(())
    }
}
