//! Shared Cache Module
//!
//! Thread-safe handle for sharing one `TtlCache` inside a process.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, TtlCache};
use crate::config::CacheConfig;
use crate::error::Result;

/// Cloneable handle to a cache guarded by a read-write lock.
///
/// `set` and `clear` hold the write lock across the in-memory update and
/// the file rewrite, so no reader observes a mapping the file does not match
/// (unless persistence itself failed). This only coordinates threads in one
/// process; separate processes sharing a file still race.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<RwLock<TtlCache>>,
}

impl SharedCache {
    /// Wraps an already opened cache.
    pub fn new(cache: TtlCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    /// Opens the cache described by `config` and wraps it.
    pub fn open(config: CacheConfig) -> Result<Self> {
        TtlCache::open(config).map(Self::new)
    }

    /// Returns a clone of the fresh value for `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Returns a clone of the value for `key`, however old it is.
    pub fn get_ignoring_ttl(&self, key: &str) -> Option<Value> {
        self.read().get_ignoring_ttl(key).cloned()
    }

    /// Looks up `key` and deserializes the payload into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str, ignore_ttl: bool) -> Result<Option<T>> {
        self.read().get_as(key, ignore_ttl)
    }

    /// Stores `value` under `key` and rewrites the backing file.
    pub fn set<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        self.write().set(key, value)
    }

    /// Drops every entry and rewrites the backing file.
    pub fn clear(&self) -> Result<()> {
        self.write().clear()
    }

    /// Returns a snapshot of entry counts split by freshness.
    pub fn stats(&self) -> CacheStats {
        self.read().stats()
    }

    /// Returns the number of entries held, including stale ones.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every mutation leaves a complete mapping behind, even on panic
    fn read(&self) -> RwLockReadGuard<'_, TtlCache> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TtlCache> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
