//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries from both cache tiers

mod cleanup;

pub use cleanup::spawn_cleanup_task;
