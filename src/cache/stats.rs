//! Cache Statistics Module
//!
//! Tracks cache performance counters and reports the contents of both tiers.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads answered by the memory tier
    pub memory_hits: u64,
    /// Reads answered by the persistent tier (and promoted)
    pub persistent_hits: u64,
    /// Reads that found nothing live in either tier
    pub misses: u64,
    /// Entries evicted from memory by the capacity bound
    pub evictions: u64,
    /// Expired keys purged, lazily or by a sweep; a key expired in both tiers counts once
    pub expirations: u64,
    /// Persistent tier operations that failed and were absorbed
    pub persistence_errors: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total hits across both tiers.
    pub fn hits(&self) -> u64 {
        self.memory_hits + self.persistent_hits
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_persistent_hit(&mut self) {
        self.persistent_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_persistence_error(&mut self) {
        self.persistence_errors += 1;
    }
}

// == Storage Report ==
/// Snapshot of what each tier holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageReport {
    /// Entries currently in the memory tier
    pub memory_items: usize,
    /// Keys enumerated in the persistent tier
    pub persistent_items: usize,
    /// Timestamp of the oldest persistent entry
    pub oldest_item: Option<DateTime<Utc>>,
    /// Timestamp of the newest persistent entry
    pub newest_item: Option<DateTime<Utc>>,
}

impl StorageReport {
    /// Builds a report from the persistent entry timestamps (Unix milliseconds).
    pub fn from_timestamps(
        memory_items: usize,
        persistent_items: usize,
        timestamps: &[u64],
    ) -> Self {
        let to_date = |ms: u64| DateTime::<Utc>::from_timestamp_millis(ms as i64);
        Self {
            memory_items,
            persistent_items,
            oldest_item: timestamps.iter().min().and_then(|&ms| to_date(ms)),
            newest_item: timestamps.iter().max().and_then(|&ms| to_date(ms)),
        }
    }
}

// == Sweep Report ==
/// Outcome of one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Expired entries removed from the memory tier
    pub memory_removed: usize,
    /// Expired entries removed from the persistent tier
    pub persistent_removed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.memory_removed + self.persistent_removed
    }
}
