//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Misses and expired entries are not errors; lookups report them as `None`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing file exists but could not be read or parsed
    #[error("Failed to load cache from {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadFailure,
    },

    /// Backing file could not be written; in-memory state is still valid
    #[error("Failed to persist cache to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be converted into a storable payload
    #[error("Failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored payload does not match the requested type
    #[error("Failed to decode value for key {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// == Load Failure ==
/// Underlying reason a backing file could not be loaded.
#[derive(Error, Debug)]
pub enum LoadFailure {
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed contents: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

impl CacheError {
    /// Returns true if this error came from loading the backing file.
    pub fn is_load(&self) -> bool {
        matches!(self, CacheError::Load { .. })
    }

    /// Returns true if this error came from writing the backing file.
    pub fn is_persist(&self) -> bool {
        matches!(self, CacheError::Persist { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
