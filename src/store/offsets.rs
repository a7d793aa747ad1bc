//! Offset Cache
//!
//! Opt-in in-memory copy of the index with precomputed data offsets.
//! The on-disk index stays authoritative; the cache is rebuilt from it on
//! every open and extended on every append.

use std::collections::HashMap;

use crate::index::{IndexEntry, ScanItem};

/// Position → (entry, data offset) table plus first-occurrence map
#[derive(Debug, Default)]
pub(crate) struct OffsetCache {
    /// Indexed by append position
    items: Vec<ScanItem>,
    /// Identifier → position of its first record
    first_by_id: HashMap<u32, u64>,
    /// Data offset the next record will get
    next_offset: u64,
    /// Set when the index ends inside an entry
    torn: Option<String>,
}

impl OffsetCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record the next entry in append order
    pub(crate) fn push(&mut self, entry: IndexEntry) {
        let position = self.items.len() as u64;
        self.items.push(ScanItem {
            position,
            entry,
            data_offset: self.next_offset,
        });
        self.first_by_id.entry(entry.identifier).or_insert(position);
        self.next_offset += u64::from(entry.payload_size);
    }

    pub(crate) fn get(&self, position: u64) -> Option<ScanItem> {
        usize::try_from(position)
            .ok()
            .and_then(|p| self.items.get(p))
            .copied()
    }

    pub(crate) fn first_by_id(&self, identifier: u32) -> Option<ScanItem> {
        self.first_by_id
            .get(&identifier)
            .and_then(|&position| self.get(position))
    }

    pub(crate) fn contains_id(&self, identifier: u32) -> bool {
        self.first_by_id.contains_key(&identifier)
    }

    /// Remember that the build scan stopped at a partial entry
    pub(crate) fn mark_torn(&mut self, detail: String) {
        self.torn = Some(detail);
    }

    pub(crate) fn torn(&self) -> Option<&str> {
        self.torn.as_deref()
    }

    pub(crate) fn len(&self) -> u64 {
        self.items.len() as u64
    }
}
