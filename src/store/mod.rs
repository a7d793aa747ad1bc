//! Store Module
//!
//! The log store: two append-only streams in one directory.
//!
//! ## Responsibilities
//! - Append records (index entry, then payload)
//! - Count records from the index length
//! - Look records up by position or identifier via a linear index scan
//! - Leave stream cursors exactly where they were after every read
//!
//! ## Directory Layout
//! ```text
//! {root}/
//!   └── bcdb/
//!       ├── idx    [id: u32 LE][size: u32 LE] ... (8 bytes per record)
//!       └── data   [payload 0][payload 1] ...     (no separators)
//! ```

mod cursor;
mod iter;
mod log_store;
mod offsets;
mod shared;
mod verify;

pub use iter::Records;
pub use log_store::LogStore;
pub use shared::SharedLogStore;
pub use verify::VerifyReport;
