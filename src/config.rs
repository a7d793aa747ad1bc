//! Configuration for bcdb
//!
//! Centralized configuration with sensible defaults.

use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::error::{BcdbError, Result};

/// Main configuration for a bcdb log store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory; must already exist.
    /// Internal structure:
    ///   {root_dir}/
    ///     └── bcdb/
    ///         ├── idx      (8-byte index entries)
    ///         └── data     (concatenated payloads)
    pub root_dir: PathBuf,

    /// How the index and data files are opened
    pub open_options: StoreOptions,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync both streams after appends
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Lookup Configuration
    // -------------------------------------------------------------------------
    /// Keep an in-memory position → data offset table
    pub offset_cache: bool,
}

/// Sync strategy for appends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced appends
    EveryNEntries { count: usize },

    /// Never fsync on append; leave it to the OS or an explicit `sync()`
    OsManaged,
}

/// File open flags handed to both streams unchanged
///
/// Mirrors the flags of [`std::fs::OpenOptions`] so callers keep ordinary
/// file-open semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub truncate: bool,
    pub append: bool,
}

impl StoreOptions {
    /// All flags off
    pub fn new() -> Self {
        Self {
            read: false,
            write: false,
            create: false,
            truncate: false,
            append: false,
        }
    }

    /// Open existing files for lookups only
    pub fn read_only() -> Self {
        Self::new().read(true)
    }

    pub fn read(mut self, yes: bool) -> Self {
        self.read = yes;
        self
    }

    pub fn write(mut self, yes: bool) -> Self {
        self.write = yes;
        self
    }

    pub fn create(mut self, yes: bool) -> Self {
        self.create = yes;
        self
    }

    pub fn truncate(mut self, yes: bool) -> Self {
        self.truncate = yes;
        self
    }

    pub fn append(mut self, yes: bool) -> Self {
        self.append = yes;
        self
    }

    /// Reject flag sets that cannot open a usable stream
    pub fn validate(&self) -> Result<()> {
        if !self.read && !self.write && !self.append {
            return Err(BcdbError::Config(
                "open options must allow reading or writing".to_string(),
            ));
        }
        Ok(())
    }

    /// Translate into std open options
    pub fn to_open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .create(self.create)
            .truncate(self.truncate)
            .append(self.append);
        options
    }
}

impl Default for StoreOptions {
    /// Read, write, create if missing; existing contents are kept
    fn default() -> Self {
        Self::new().read(true).write(true).create(true)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            open_options: StoreOptions::default(),
            sync_strategy: SyncStrategy::OsManaged,
            offset_cache: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the root directory (must exist when the store is opened)
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the open flags for both streams
    pub fn open_options(mut self, options: StoreOptions) -> Self {
        self.config.open_options = options;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Enable or disable the in-memory offset cache
    pub fn offset_cache(mut self, enabled: bool) -> Self {
        self.config.offset_cache = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
