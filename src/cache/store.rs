//! Cache Store Module
//!
//! Main cache engine: an in-memory entry map kept in step with its backing file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::finite::ensure_finite;
use crate::cache::{CacheEntry, CacheStats, Clock, FileBackend, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == TTL Cache ==
/// Keyed, time-bounded value store persisted to a single file.
///
/// Every `set` and `clear` rewrites the whole backing file before returning.
/// Lookups never mutate anything: expired entries are hidden from `get` but
/// stay in memory and on disk until overwritten or cleared.
#[derive(Debug)]
pub struct TtlCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Backing file adapter
    backend: FileBackend,
    /// Seconds an entry stays fresh
    ttl_seconds: u64,
    /// Time source for stamping and aging entries
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    // == Constructor ==
    /// Opens the cache described by `config`, loading any persisted entries.
    ///
    /// A missing backing file starts an empty cache. A file that exists but
    /// cannot be read or parsed fails with `CacheError::Load`.
    pub fn open(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Opens the cache with a custom time source.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let backend = FileBackend::new(config.path);
        let entries = backend.load()?;

        let cache = Self {
            entries,
            backend,
            ttl_seconds: config.ttl_seconds,
            clock,
        };

        let stats = cache.stats();
        info!(
            "Cache opened at {} with {} entries ({:.0}% stale), ttl={}s",
            cache.path().display(),
            stats.total_entries,
            stats.stale_ratio() * 100.0,
            cache.ttl_seconds
        );

        Ok(cache)
    }

    // == Get ==
    /// Returns the value for `key` if present and still fresh.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.lookup(key, false)
    }

    /// Returns the value for `key` if present, however old it is.
    pub fn get_ignoring_ttl(&self, key: &str) -> Option<&Value> {
        self.lookup(key, true)
    }

    /// Looks up `key`, optionally bypassing the freshness check.
    ///
    /// A cached `false`, `0`, `null` or empty value is returned as `Some`;
    /// `None` only ever means "never set" or "expired".
    pub fn lookup(&self, key: &str, ignore_ttl: bool) -> Option<&Value> {
        let entry = self.entries.get(key)?;

        if !ignore_ttl && entry.is_expired(self.clock.now(), self.ttl_seconds) {
            debug!("Cache entry {} is stale", key);
            return None;
        }

        Some(&entry.value)
    }

    /// Looks up `key` and deserializes the payload into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str, ignore_ttl: bool) -> Result<Option<T>> {
        self.lookup(key, ignore_ttl)
            .map(|value| {
                T::deserialize(value).map_err(|source| CacheError::Decode {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    // == Set ==
    /// Stores `value` under `key`, stamped with the current time, and rewrites
    /// the backing file.
    ///
    /// A payload JSON cannot hold exactly (NaN, infinities, non-string map
    /// keys) is rejected with `CacheError::Encode` and nothing changes.
    /// If the write fails the new entry is still visible in memory and
    /// `CacheError::Persist` is returned so the caller can decide to retry.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        let value = ensure_finite(value)
            .and_then(|_| serde_json::to_value(value))
            .map_err(|source| CacheError::Encode {
                key: key.clone(),
                source,
            })?;

        let entry = CacheEntry::new(value, self.clock.now());
        self.entries.insert(key.clone(), entry);
        debug!("Cache set {}", key);

        self.persist()
    }

    // == Clear ==
    /// Drops every entry and rewrites the backing file as an empty store.
    pub fn clear(&mut self) -> Result<()> {
        let removed = self.entries.len();
        self.entries.clear();
        info!("Cache cleared, {} entries removed", removed);

        self.persist()
    }

    // == Stats ==
    /// Returns a snapshot of entry counts split by freshness.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let stale = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now, self.ttl_seconds))
            .count();

        CacheStats::new(self.entries.len(), stale)
    }

    /// Returns when `key` was last written, fresh or not.
    pub fn stored_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).and_then(CacheEntry::stored_at_utc)
    }

    /// Returns true if `key` has an entry, fresh or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the number of entries held, including stale ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freshness window in seconds.
    pub fn ttl(&self) -> u64 {
        self.ttl_seconds
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.backend.path()
    }

    fn persist(&self) -> Result<()> {
        self.backend.save(&self.entries).inspect_err(|e| {
            warn!("{}; in-memory cache is ahead of disk", e);
        })
    }
}
