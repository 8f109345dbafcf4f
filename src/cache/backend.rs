//! Backing Store Module
//!
//! Reads and writes the whole cache mapping as a single JSON file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::Builder;
use tracing::{debug, info};

use crate::cache::{CacheEntry, FORMAT_VERSION};
use crate::error::{CacheError, LoadFailure, Result};

/// Prefix of the temporary files `save` writes before renaming.
const TEMP_PREFIX: &str = ".ttl-cache-";

/// On-disk layout written by `save`.
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    entries: BTreeMap<&'a str, &'a CacheEntry>,
}

/// On-disk layout read by `load`. Entries are decoded only after the
/// version has been checked.
#[derive(Deserialize)]
struct RawEnvelope {
    version: u32,
    entries: Value,
}

// == File Backend ==
/// Persists the full entry mapping to one file, rewriting it on every save.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Load ==
    /// Reads every persisted entry.
    ///
    /// A missing file yields an empty mapping. Any other read failure, a
    /// malformed file, or an unknown format version is a `CacheError::Load`.
    pub fn load(&self) -> Result<HashMap<String, CacheEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache file at {}, starting empty", self.path.display());
                return Ok(HashMap::new());
            }
            Err(e) => return Err(self.load_error(e.into())),
        };

        let raw: RawEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| self.load_error(e.into()))?;

        if raw.version != FORMAT_VERSION {
            return Err(self.load_error(LoadFailure::Version {
                found: raw.version,
                expected: FORMAT_VERSION,
            }));
        }

        let entries: HashMap<String, CacheEntry> =
            serde_json::from_value(raw.entries).map_err(|e| self.load_error(e.into()))?;

        info!(
            "Loaded {} cache entries from {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries)
    }

    // == Save ==
    /// Replaces the backing file with the full mapping.
    ///
    /// The new contents go to a temporary file in the same directory, are
    /// synced, then renamed over the old file. Readers and later `load`s see
    /// either the previous file or the new one, never a partial write.
    /// Missing parent directories are created first.
    pub fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        let envelope = EnvelopeRef {
            version: FORMAT_VERSION,
            entries: entries.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        };

        // String keys and JSON values always encode
        let json = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| self.persist_error(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.persist_error(e))?;

        let mut temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| self.persist_error(e))?;
        temp.write_all(&json).map_err(|e| self.persist_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.persist_error(e))?;

        // On failure the temp file is dropped and removed; the old file is untouched
        temp.persist(&self.path)
            .map_err(|e| self.persist_error(e.error))?;

        debug!(
            "Persisted {} cache entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load_error(&self, source: LoadFailure) -> CacheError {
        CacheError::Load {
            path: self.path.clone(),
            source,
        }
    }

    fn persist_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Persist {
            path: self.path.clone(),
            source,
        }
    }
}
