//! Facade Module
//!
//! Typed convenience layers binding named remote fetches to cache keys.

mod dashboard;
mod loader;

pub use dashboard::DashboardCache;
pub use loader::{CachedLoader, FetchMode};
