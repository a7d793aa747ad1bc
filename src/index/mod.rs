//! Index Module
//!
//! Fixed-size metadata entries describing where each payload lives.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Entry 0                                  │
//! │ ┌──────────────────┬───────────────────┐ │
//! │ │ Identifier (4)   │ Payload Size (4)  │ │
//! │ └──────────────────┴───────────────────┘ │
//! ├──────────────────────────────────────────┤
//! │ Entry 1                                  │
//! │ ┌──────────────────┬───────────────────┐ │
//! │ │ Identifier (4)   │ Payload Size (4)  │ │
//! │ └──────────────────┴───────────────────┘ │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Both fields are little-endian u32. There is no header and no footer; the
//! payload offset of entry N is the sum of the sizes of entries `0..N`.

mod entry;
mod scanner;

pub use entry::{IndexEntry, ENTRY_SIZE};
pub use scanner::{IndexScanner, ScanItem};

pub(crate) use scanner::read_full;
