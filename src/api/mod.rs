//! API Module
//!
//! HTTP handlers and routing for the cache gateway.
//!
//! # Endpoints
//! - `GET /api/dashboard/*dataset` - Cached dashboard dataset
//! - `GET /cache/stats` - Cache counters and tier contents
//! - `DELETE /cache` - Clear both tiers
//! - `DELETE /cache/:key` - Invalidate one key
//! - `POST /cache/invalidate` - Invalidate several keys
//! - `POST /cache/cleanup` - Run an expiry sweep now
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
