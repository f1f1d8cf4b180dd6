//! Cache Module
//!
//! Two-tier caching: a bounded in-memory tier over a persistent tier, with
//! per-entry TTL expiration and FIFO capacity eviction.

mod entry;
mod order;
mod stats;
mod tiered;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, duration_ms, CacheEntry};
pub use order::InsertionOrder;
pub use stats::{CacheStats, StorageReport, SweepReport};
pub(crate) use tiered::validate_key;
pub use tiered::TieredCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
///
/// Keeps hex-encoded file names of `FileStore` records under common
/// filesystem limits.
pub const MAX_KEY_LENGTH: usize = 120;
