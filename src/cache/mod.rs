//! Expiring cache for external API responses.
//!
//! This module provides an in-memory cache with TTLs classified by key,
//! substring invalidation, and optional write-through to disk for warm
//! starts.

pub mod backend;
pub mod clock;
pub mod entry;
pub mod store;
pub mod ttl;

pub use backend::{CacheBackend, FileBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use store::{CacheStats, ExpiringCache};
pub use ttl::{
    format_duration, parse_ttl, TtlRule, TtlRules, DYNAMIC_RESOURCES, STATIC_RESOURCES,
};

/// Get the default directory for persisted cache entries.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("epicstamp")
        .join("cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_dir_valid() {
        let path = default_cache_dir();
        assert!(path.ends_with("cache"));
    }
}
