//! Store Verification
//!
//! Read-only consistency check of the two streams. Nothing is repaired.

use crate::error::{BcdbError, Result};
use crate::index::{IndexScanner, ENTRY_SIZE};

use super::cursor::CursorGuard;

/// Result of a verification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of complete index entries
    pub entries: u64,

    /// Bytes of a partial trailing index entry (0 when aligned)
    pub torn_index_bytes: u64,

    /// Data length the index describes (sum of payload sizes)
    pub expected_data_len: u64,

    /// Data length actually on disk
    pub actual_data_len: u64,
}

impl VerifyReport {
    /// No torn index tail and data length matches the index exactly
    pub fn is_consistent(&self) -> bool {
        self.torn_index_bytes == 0 && self.expected_data_len == self.actual_data_len
    }

    /// Payload bytes the index promises but the data stream lacks
    pub fn missing_data_bytes(&self) -> u64 {
        self.expected_data_len.saturating_sub(self.actual_data_len)
    }

    /// Data bytes no index entry accounts for
    pub fn orphaned_data_bytes(&self) -> u64 {
        self.actual_data_len.saturating_sub(self.expected_data_len)
    }
}

/// Scan the full index and compare against the data length
pub(super) fn verify_streams(
    index: CursorGuard<'_>,
    index_len: u64,
    actual_data_len: u64,
) -> Result<VerifyReport> {
    let mut scanner = IndexScanner::new(index)?;

    for item in &mut scanner {
        match item {
            Ok(_) => continue,
            Err(BcdbError::CorruptStore(_)) => break,
            Err(e) => return Err(e),
        }
    }

    let entries = scanner.entries_read();
    let expected_data_len = scanner.data_bytes_described();
    scanner.into_inner().restore()?;

    Ok(VerifyReport {
        entries,
        torn_index_bytes: index_len.saturating_sub(entries * ENTRY_SIZE as u64),
        expected_data_len,
        actual_data_len,
    })
}
