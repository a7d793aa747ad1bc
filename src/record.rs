//! Record definitions
//!
//! The logical unit stored by the engine.

use bytes::Bytes;

/// One `(identifier, payload)` pair as appended by a caller
///
/// Identifiers are not unique; the store never inspects payload contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Caller-supplied identifier
    pub identifier: u32,

    /// Raw payload bytes, exactly as appended
    pub payload: Bytes,
}

impl Record {
    pub fn new(identifier: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            identifier,
            payload: payload.into(),
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
