//! Cache Entry Module
//!
//! Defines the record stored in both tiers: a value stamped with its creation
//! time and its own expiry window.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cache entry with value and expiry metadata.
///
/// Serialized as `{"value": .., "timestamp": .., "maxAge": ..}`, the same
/// shape in memory and in the persistent tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation or refresh time (Unix milliseconds)
    pub timestamp: u64,
    /// Expiry window in milliseconds
    pub max_age: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(value: T, max_age: u64) -> Self {
        Self::with_timestamp(value, current_timestamp_ms(), max_age)
    }

    /// Creates an entry with an explicit timestamp.
    pub fn with_timestamp(value: T, timestamp: u64, max_age: u64) -> Self {
        Self {
            value,
            timestamp,
            max_age,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once strictly more than `max_age` milliseconds have
    /// elapsed since `timestamp`; at exactly `max_age` it is still valid.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against a caller-supplied clock.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.age_ms(now) > self.max_age
    }

    /// Milliseconds elapsed since the entry was stamped, zero if stamped in the future.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Time To Live ==
    /// Returns the remaining validity window in milliseconds, zero once expired.
    pub fn remaining_ms(&self) -> u64 {
        self.max_age
            .saturating_sub(self.age_ms(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Converts a duration to a max age in milliseconds.
///
/// A non-zero duration below one millisecond rounds up to 1; durations past
/// `u64::MAX` milliseconds saturate.
pub fn duration_ms(duration: Duration) -> u64 {
    if duration.is_zero() {
        return 0;
    }
    u64::try_from(duration.as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
