//! Index entry codec
//!
//! Encodes and decodes the 8-byte on-disk shadow of a record's metadata.

use bytes::{Buf, BufMut};

use crate::error::{BcdbError, Result};

/// Size of one index entry: identifier (4) + payload size (4)
pub const ENTRY_SIZE: usize = 8;

/// Metadata of one appended record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub identifier: u32,
    pub payload_size: u32,
}

impl IndexEntry {
    pub fn new(identifier: u32, payload_size: u32) -> Self {
        Self {
            identifier,
            payload_size,
        }
    }

    /// Build the entry for a payload, rejecting lengths a u32 cannot hold
    pub fn for_payload(identifier: u32, payload: &[u8]) -> Result<Self> {
        let payload_size =
            u32::try_from(payload.len()).map_err(|_| BcdbError::PayloadTooLarge(payload.len()))?;
        Ok(Self::new(identifier, payload_size))
    }

    /// Serialize as `[identifier LE][payload_size LE]`
    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut buf = [0u8; ENTRY_SIZE];
        let mut out = &mut buf[..];
        out.put_u32_le(self.identifier);
        out.put_u32_le(self.payload_size);
        buf
    }

    /// Deserialize from exactly one encoded entry
    pub fn decode(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut buf = &bytes[..];
        let identifier = buf.get_u32_le();
        let payload_size = buf.get_u32_le();
        Self {
            identifier,
            payload_size,
        }
    }
}
