//! Cache Module
//!
//! Provides a TTL cache whose whole mapping is persisted to one backing file.

mod backend;
mod clock;
mod entry;
mod finite;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use backend::FileBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// Seconds an entry stays fresh unless the config says otherwise
pub const DEFAULT_TTL_SECONDS: u64 = 600;

/// Backing file name used when no path is configured
pub const DEFAULT_FILE_NAME: &str = "cache.dat";

/// Version tag written into every backing file
pub const FORMAT_VERSION: u32 = 1;
