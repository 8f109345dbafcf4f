//! TTL File Cache - A small time-bounded cache persisted to a single file
//!
//! Sits in front of a rate-limited API so repeated lookups can be served
//! from memory, and survive process restarts through a flat backing file.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    CacheEntry, CacheStats, Clock, ManualClock, SharedCache, SystemClock, TtlCache,
    DEFAULT_FILE_NAME, DEFAULT_TTL_SECONDS,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
