//! Settings loading and validation.
//!
//! - Schema definitions in [`settings`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use epicstamp::config::{load_settings, Settings};
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "cache:\n  default_ttl: 90s\n").unwrap();
//!
//! let settings = load_settings(Some(&path)).unwrap();
//! let rules = settings.cache_rules().unwrap();
//! assert_eq!(rules.default_ttl.num_seconds(), 90);
//! ```

pub mod loader;
pub mod settings;

pub use loader::{default_config_path, load_settings, load_settings_file, parse_settings};
pub use settings::{CacheSettings, Settings, TtlRuleSettings};
