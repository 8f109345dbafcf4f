//! Configuration Module
//!
//! Describes where a cache persists its contents and how long entries stay fresh.

use std::path::{Path, PathBuf};

use crate::cache::{DEFAULT_FILE_NAME, DEFAULT_TTL_SECONDS};

/// Cache configuration parameters.
///
/// The backing path is always explicit so several independent caches can
/// live side by side, and tests can point a cache at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// File the whole cache mapping is persisted to
    pub path: PathBuf,
    /// Seconds an entry stays fresh after it was stored
    pub ttl_seconds: u64,
}

impl CacheConfig {
    /// Creates a config for the given backing file with the default TTL.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    /// Creates a config that stores `cache.dat` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    /// Overrides the freshness window.
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}
