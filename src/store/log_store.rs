//! Log Store
//!
//! Owns the index and data streams and implements append, count and the
//! two scan-based lookups.

use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::config::{Config, StoreOptions, SyncStrategy};
use crate::error::{BcdbError, Result};
use crate::index::{read_full, IndexEntry, IndexScanner, ScanItem, ENTRY_SIZE};
use crate::record::Record;

use super::cursor::CursorGuard;
use super::iter::Records;
use super::offsets::OffsetCache;
use super::verify::{verify_streams, VerifyReport};

/// Append-only record store over two streams
///
/// ## Append Protocol
/// The index entry is written before the payload. After a crash between the
/// two writes the index is ahead of the data: the last entry describes bytes
/// that are missing, and reading it reports `CorruptStore`.
/// `open` measures the data length the index describes; while the streams
/// disagree (or the index ends inside an entry) `append` refuses with
/// `CorruptStore` so later records cannot shift.
///
/// ## Concurrency
/// Every operation takes `&mut self`: lookups move the file cursors and
/// put them back, so they need the same exclusive access as `append`.
/// Wrap the store in [`SharedLogStore`](super::SharedLogStore) to use it
/// from several threads.
pub struct LogStore {
    /// Store configuration
    config: Config,

    /// `<root_dir>/bcdb`
    store_dir: PathBuf,

    /// Index stream: 8-byte entries
    index: File,

    /// Data stream: concatenated payloads
    data: File,

    /// Append position of the index stream
    index_pos: u64,

    /// Append position of the data stream
    data_pos: u64,

    /// Data length the index describes (sum of payload sizes)
    described_data_len: u64,

    /// Appends since the last fsync
    unsynced: usize,

    /// In-memory offsets (only when enabled in config)
    offsets: Option<OffsetCache>,
}

impl LogStore {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const STORE_DIR: &'static str = "bcdb";
    const INDEX_FILENAME: &'static str = "idx";
    const DATA_FILENAME: &'static str = "data";

    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Check the root directory exists
    /// 2. Create `<root>/bcdb/` if missing
    /// 3. Open both streams with the configured flags
    /// 4. Move both cursors to end-of-stream
    /// 5. Check the index against the data length
    /// 6. Build the offset cache if enabled
    ///
    /// A damaged store still opens for lookups; `append` refuses it.
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Root directory must already exist
        if !config.root_dir.is_dir() {
            return Err(BcdbError::DirectoryNotFound(config.root_dir.clone()));
        }
        config.open_options.validate()?;

        // Step 2: Store directory is ours to create
        let store_dir = config.root_dir.join(Self::STORE_DIR);
        if !store_dir.exists() {
            fs::create_dir(&store_dir)?;
        }

        // Step 3: Open both streams with the caller's flags
        let options = config.open_options.to_open_options();
        let mut index = options.open(store_dir.join(Self::INDEX_FILENAME))?;
        let mut data = options.open(store_dir.join(Self::DATA_FILENAME))?;

        // Step 4: Append position = end of each stream
        let index_pos = index.seek(SeekFrom::End(0))?;
        let data_pos = data.seek(SeekFrom::End(0))?;

        let mut store = Self {
            config,
            store_dir,
            index,
            data,
            index_pos,
            data_pos,
            described_data_len: 0,
            unsynced: 0,
            offsets: None,
        };

        // Step 5: One reference scan for the described data length
        let report = store.verify()?;
        store.described_data_len = report.expected_data_len;
        if !report.is_consistent() {
            warn!(
                torn_index_bytes = report.torn_index_bytes,
                missing_data_bytes = report.missing_data_bytes(),
                orphaned_data_bytes = report.orphaned_data_bytes(),
                "index and data streams disagree (torn write); appends are refused"
            );
        }

        // Step 6: Offset cache from one reference scan
        if store.config.offset_cache {
            let cache = store.build_offset_cache()?;
            store.offsets = Some(cache);
        }

        debug!(
            dir = %store.store_dir.display(),
            index_len = store.index_pos,
            data_len = store.data_pos,
            offset_cache = store.offsets.is_some(),
            "opened log store"
        );

        Ok(store)
    }

    /// Open with explicit open flags (default sync strategy, no cache)
    pub fn open_with(root_dir: &Path, options: StoreOptions) -> Result<Self> {
        let config = Config::builder()
            .root_dir(root_dir)
            .open_options(options)
            .build();
        Self::open(config)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified root directory
    pub fn open_path(root_dir: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.root_dir = root_dir.to_path_buf();
        Self::open(config)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append one record
    ///
    /// Writes the 8-byte index entry, then the payload. No uniqueness check
    /// on `identifier`; an empty payload is stored as a zero-size entry.
    pub fn append(&mut self, identifier: u32, payload: &[u8]) -> Result<()> {
        // Rejected before any byte is written
        let entry = IndexEntry::for_payload(identifier, payload)?;
        self.check_appendable()?;

        // Step 1: Index entry
        self.index.seek(SeekFrom::Start(self.index_pos))?;
        self.index.write_all(&entry.encode())?;
        self.index_pos += ENTRY_SIZE as u64;

        // Step 2: Payload
        self.data.seek(SeekFrom::Start(self.data_pos))?;
        self.data.write_all(payload)?;
        self.data_pos += payload.len() as u64;
        self.described_data_len += u64::from(entry.payload_size);

        if let Some(cache) = self.offsets.as_mut() {
            cache.push(entry);
        }

        trace!(
            identifier,
            payload_size = entry.payload_size,
            index_pos = self.index_pos,
            data_pos = self.data_pos,
            "appended record"
        );

        // Step 3: Sync per strategy
        self.unsynced += 1;
        let due = match self.config.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced >= count,
            SyncStrategy::OsManaged => false,
        };
        if due {
            self.sync()?;
        }

        Ok(())
    }

    /// Force both streams to disk
    pub fn sync(&mut self) -> Result<()> {
        self.index.sync_all()?;
        self.data.sync_all()?;
        self.unsynced = 0;
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Number of complete index entries
    ///
    /// Seeks to the end of the index and back; a partial trailing entry is
    /// not counted.
    pub fn count(&mut self) -> Result<u64> {
        let mut guard = CursorGuard::capture(&mut self.index)?;
        let end = guard.seek(SeekFrom::End(0))?;
        guard.restore()?;
        Ok(end / ENTRY_SIZE as u64)
    }

    /// True when the index holds no complete entry
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// Whether any record carries `identifier`
    ///
    /// A torn trailing index entry ends the scan like end-of-stream.
    pub fn has_index_by_id(&mut self, identifier: u32) -> Result<bool> {
        if let Some(cache) = &self.offsets {
            return Ok(cache.contains_id(identifier));
        }

        let mut scanner = IndexScanner::new(CursorGuard::capture(&mut self.index)?)?;
        let found = loop {
            match scanner.next_entry() {
                Ok(Some(item)) if item.entry.identifier == identifier => break true,
                Ok(Some(_)) => continue,
                Ok(None) => break false,
                Err(BcdbError::CorruptStore(detail)) => {
                    warn!(%detail, "index scan stopped at torn entry");
                    break false;
                }
                Err(e) => return Err(e),
            }
        };
        scanner.into_inner().restore()?;

        Ok(found)
    }

    /// Record at 0-based append `position`
    ///
    /// Returns:
    /// - `Ok(record)` — found
    /// - `Err(OutOfBounds)` — `position >= count()`
    /// - `Err(CorruptStore)` — index or data shorter than the layout demands
    pub fn get_by_index(&mut self, position: u64) -> Result<Record> {
        let item = match &self.offsets {
            Some(cache) => cache.get(position),
            None => self.scan_for(|item| item.position == position)?,
        };

        match item {
            Some(item) => self.read_record(item),
            None => {
                self.check_cache_tear()?;
                Err(BcdbError::OutOfBounds {
                    position,
                    count: self.count()?,
                })
            }
        }
    }

    /// First record (in append order) carrying `identifier`
    ///
    /// Returns:
    /// - `Ok(record)` — found
    /// - `Err(NotFound)` — no record has this identifier
    /// - `Err(CorruptStore)` — index or data shorter than the layout demands
    pub fn get_by_id(&mut self, identifier: u32) -> Result<Record> {
        let item = match &self.offsets {
            Some(cache) => cache.first_by_id(identifier),
            None => self.scan_for(|item| item.entry.identifier == identifier)?,
        };

        match item {
            Some(item) => self.read_record(item),
            None => {
                self.check_cache_tear()?;
                Err(BcdbError::NotFound(identifier))
            }
        }
    }

    /// Iterate all records in append order
    ///
    /// The iterator borrows the store; cursors are restored when it is
    /// dropped or [`Records::finish`] is called.
    pub fn records(&mut self) -> Result<Records<'_>> {
        let index = CursorGuard::capture(&mut self.index)?;
        let data = CursorGuard::capture(&mut self.data)?;
        Records::new(index, data, self.data_pos)
    }

    /// Check index alignment and index/data length agreement
    pub fn verify(&mut self) -> Result<VerifyReport> {
        let index_len = self.index.metadata()?.len();
        let data_len = self.data.metadata()?.len();
        verify_streams(CursorGuard::capture(&mut self.index)?, index_len, data_len)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Close the store gracefully
    ///
    /// Syncs both streams when they were opened for writing
    pub fn close(mut self) -> Result<()> {
        let options = self.config.open_options;
        if options.write || options.append {
            self.sync()?;
        }
        debug!(dir = %self.store_dir.display(), "closed log store");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the root directory path
    pub fn root_dir(&self) -> &Path {
        &self.config.root_dir
    }

    /// Get the store directory path (where `idx` and `data` live)
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether lookups are answered from the in-memory offset cache
    pub fn has_offset_cache(&self) -> bool {
        self.offsets.is_some()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Refuse appends to a store whose streams a torn write left unaligned
    ///
    /// Writing past a partial index entry or a short/long data stream would
    /// shift every later record.
    fn check_appendable(&self) -> Result<()> {
        if self.index_pos % ENTRY_SIZE as u64 != 0 {
            return Err(BcdbError::CorruptStore(format!(
                "index stream ends inside an entry ({} bytes); refusing to append",
                self.index_pos
            )));
        }
        if self.data_pos != self.described_data_len {
            return Err(BcdbError::CorruptStore(format!(
                "index describes {} data bytes but data stream holds {}; refusing to append",
                self.described_data_len, self.data_pos
            )));
        }
        Ok(())
    }

    /// A cached miss behind a torn index tail is damage, as on the scan path
    fn check_cache_tear(&self) -> Result<()> {
        match self.offsets.as_ref().and_then(|cache| cache.torn()) {
            Some(detail) => Err(BcdbError::CorruptStore(detail.to_string())),
            None => Ok(()),
        }
    }

    /// Reference scan: first index entry matching `pred`
    ///
    /// The index cursor is restored on every path.
    fn scan_for<F>(&mut self, pred: F) -> Result<Option<ScanItem>>
    where
        F: FnMut(&ScanItem) -> bool,
    {
        let mut scanner = IndexScanner::new(CursorGuard::capture(&mut self.index)?)?;
        let found = scanner.find_entry(pred)?;
        scanner.into_inner().restore()?;
        Ok(found)
    }

    /// Read the payload an index entry points at
    fn read_record(&mut self, item: ScanItem) -> Result<Record> {
        if item.data_end() > self.data_pos {
            return Err(BcdbError::CorruptStore(format!(
                "record {} ends at data offset {} but data stream holds {} bytes",
                item.position,
                item.data_end(),
                self.data_pos
            )));
        }

        let mut data = CursorGuard::capture(&mut self.data)?;
        data.seek(SeekFrom::Start(item.data_offset))?;

        let mut payload = vec![0u8; item.entry.payload_size as usize];
        let read = read_full(&mut data, &mut payload)?;
        if read < payload.len() {
            return Err(BcdbError::CorruptStore(format!(
                "record {} expects {} payload bytes at data offset {}, found {}",
                item.position, item.entry.payload_size, item.data_offset, read
            )));
        }
        data.restore()?;

        Ok(Record::new(item.entry.identifier, payload))
    }

    /// One reference scan of the index into memory
    fn build_offset_cache(&mut self) -> Result<OffsetCache> {
        let mut cache = OffsetCache::new();
        let mut scanner = IndexScanner::new(CursorGuard::capture(&mut self.index)?)?;

        for item in &mut scanner {
            match item {
                Ok(item) => cache.push(item.entry),
                Err(BcdbError::CorruptStore(detail)) => {
                    warn!(%detail, "offset cache stops at torn entry");
                    cache.mark_torn(detail);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        scanner.into_inner().restore()?;

        debug!(entries = cache.len(), "built offset cache");
        Ok(cache)
    }
}
