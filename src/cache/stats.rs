//! Cache Statistics Module
//!
//! Point-in-time counts of fresh and stale entries.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of what the cache currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries held, regardless of age
    pub total_entries: usize,
    /// Entries a plain `get` would still return
    pub fresh_entries: usize,
    /// Entries past their TTL but still retained
    pub stale_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from the total and stale counts.
    pub fn new(total_entries: usize, stale_entries: usize) -> Self {
        Self {
            total_entries,
            fresh_entries: total_entries.saturating_sub(stale_entries),
            stale_entries,
        }
    }

    // == Stale Ratio ==
    /// Fraction of held entries that are stale.
    ///
    /// Returns 0.0 for an empty cache.
    pub fn stale_ratio(&self) -> f64 {
        if self.total_entries == 0 {
            0.0
        } else {
            self.stale_entries as f64 / self.total_entries as f64
        }
    }
}
