//! Error types for bcdb
//!
//! Provides a closed set of error kinds so callers can match on the
//! failure category instead of message text.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using BcdbError
pub type Result<T> = std::result::Result<T, BcdbError>;

/// Unified error type for bcdb operations
#[derive(Debug, Error)]
pub enum BcdbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("The directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Position {position} out of bounds (store holds {count} records)")]
    OutOfBounds { position: u64, count: u64 },

    #[error("No record with identifier {0}")]
    NotFound(u32),

    // -------------------------------------------------------------------------
    // Store Integrity Errors
    // -------------------------------------------------------------------------
    #[error("Store corruption detected: {0}")]
    CorruptStore(String),

    #[error("Payload of {0} bytes does not fit a u32 size field")]
    PayloadTooLarge(usize),
}

impl BcdbError {
    /// True for the two "record is absent" kinds (as opposed to damage or I/O)
    pub fn is_not_found(&self) -> bool {
        matches!(self, BcdbError::NotFound(_) | BcdbError::OutOfBounds { .. })
    }
}
