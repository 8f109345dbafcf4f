//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their freshness check.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with its payload and write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write timestamp (Unix seconds)
    pub stored_at: i64,
    /// The stored payload
    pub value: Value,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with `now`.
    pub fn new(value: Value, now: i64) -> Self {
        Self {
            value,
            stored_at: now,
        }
    }

    // == Age ==
    /// Seconds elapsed between the write and `now`.
    ///
    /// Negative when the clock moved backwards since the write.
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.stored_at)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl_seconds`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is still fresh;
    /// it only expires once the age is strictly greater.
    pub fn is_expired(&self, now: i64, ttl_seconds: u64) -> bool {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        self.age(now) > ttl
    }

    /// Returns the write time as a UTC timestamp, if representable.
    pub fn stored_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.stored_at, 0).single()
    }
}
