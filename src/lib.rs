//! # bcdb
//!
//! A minimal append-only record store:
//! - Immutable `(identifier, payload)` records
//! - Lookup by append position or by identifier
//! - Two streams on disk: fixed-size index entries and raw payload bytes
//! - No hashing or chaining between records; this is a plain log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SharedLogStore (optional)                    │
//! │                   (Arc<Mutex<LogStore>>)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        LogStore                              │
//! │         append / count / has_index_by_id / get_by_*          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  bcdb/idx   │          │  bcdb/data  │
//!   │ (8B entries)│          │ (payloads)  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use bcdb::LogStore;
//!
//! # fn main() -> bcdb::Result<()> {
//! let mut store = LogStore::open_path(std::path::Path::new("/tmp"))?;
//! store.append(1234, b"Test123!")?;
//!
//! assert_eq!(store.get_by_index(0)?.payload, &b"Test123!"[..]);
//! assert_eq!(store.get_by_id(1234)?.payload, &b"Test123!"[..]);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod index;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BcdbError, Result};
pub use config::{Config, StoreOptions, SyncStrategy};
pub use record::Record;
pub use store::{LogStore, Records, SharedLogStore, VerifyReport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bcdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
