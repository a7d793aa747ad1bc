//! Shared Log Store
//!
//! Thread-safe handle around a single `LogStore`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::record::Record;

use super::{LogStore, VerifyReport};

/// Cloneable handle serializing all access to one store
///
/// ## Concurrency
/// One mutex covers every operation. Lookups seek and restore the same file
/// handles an append writes through, so readers need exclusive access too;
/// a reader-writer lock would buy nothing here.
#[derive(Clone)]
pub struct SharedLogStore {
    inner: Arc<Mutex<LogStore>>,
}

impl SharedLogStore {
    pub fn new(store: LogStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Open a store and wrap it
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(LogStore::open(config)?))
    }

    pub fn append(&self, identifier: u32, payload: &[u8]) -> Result<()> {
        self.inner.lock().append(identifier, payload)
    }

    pub fn count(&self) -> Result<u64> {
        self.inner.lock().count()
    }

    pub fn has_index_by_id(&self, identifier: u32) -> Result<bool> {
        self.inner.lock().has_index_by_id(identifier)
    }

    pub fn get_by_index(&self, position: u64) -> Result<Record> {
        self.inner.lock().get_by_index(position)
    }

    pub fn get_by_id(&self, identifier: u32) -> Result<Record> {
        self.inner.lock().get_by_id(identifier)
    }

    pub fn verify(&self) -> Result<VerifyReport> {
        self.inner.lock().verify()
    }

    pub fn sync(&self) -> Result<()> {
        self.inner.lock().sync()
    }

    /// Run several operations under one lock acquisition
    pub fn with_store<T>(&self, f: impl FnOnce(&mut LogStore) -> T) -> T {
        let mut store = self.inner.lock();
        f(&mut store)
    }

    /// Take the store back once no other handle exists
    pub fn into_inner(self) -> Option<LogStore> {
        Arc::try_unwrap(self.inner).ok().map(|store| store.into_inner())
    }
}
