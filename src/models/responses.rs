//! Response DTOs for the cache gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, StorageReport};

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Counters since startup
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate across both tiers
    pub hit_rate: f64,
    /// Contents of each tier
    pub storage: StorageReport,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats, storage: StorageReport) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            storage,
        }
    }
}

/// Response body for key invalidation (DELETE /cache/:key, POST /cache/invalidate)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The keys that were invalidated
    pub keys: Vec<String>,
}

impl InvalidateResponse {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            message: format!("{} key(s) invalidated", keys.len()),
            keys,
        }
    }
}

/// Response body for a full clear (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for rejected requests
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
