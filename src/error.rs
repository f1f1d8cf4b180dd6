//! Error types for the tiered cache
//!
//! Three families: persistence faults (absorbed by the cache), upstream fetch
//! faults (surfaced to callers) and the crate-level `CacheError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Persistence Error ==
/// Failure of the persistent tier.
///
/// Never escapes `TieredCache`: it is logged and the memory tier stays
/// authoritative.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Filesystem or device failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be decoded
    #[error("Corrupt record for key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == Fetch Error ==
/// Failure of an upstream fetch callback.
///
/// `Clone` so one shared in-flight fetch can report the same failure to every
/// waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection or request failure
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status
    #[error("Upstream {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Upstream body was not the expected JSON
    #[error("Upstream response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the cache and its facades.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Upstream fetch failed; nothing was cached
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Value could not be converted to or from its stored JSON form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rejected cache key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// No dashboard dataset is served under this path
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::UnknownDataset(_) => StatusCode::NOT_FOUND,
            CacheError::Serialization(_) | CacheError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
