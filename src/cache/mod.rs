//! Cache Module
//!
//! Two-tier image URI cache: memory index over a durable key-value store,
//! with TTL expiry and maintenance sweeps.

mod clock;
mod entry;
mod handle;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{cache_key, is_cache_key, source_url, CacheEntry};
pub use handle::CachedImage;
pub use stats::CacheStats;
pub use store::{ClearReport, ImageCache, Outcome, Resolution, SweepReport};

// == Public Constants ==
/// Namespace prefix of every durable key owned by the image cache
pub const CACHE_PREFIX: &str = "@image_cache_";

/// Default record lifetime in milliseconds (7 days)
pub const DEFAULT_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;
