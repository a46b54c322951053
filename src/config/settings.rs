//! Settings schema.
//!
//! ```yaml
//! templates_dir: ~/epics
//! cache:
//!   persist: true
//!   default_ttl: 5m
//!   rules:
//!     - pattern: workflows
//!       ttl: 30m
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::{default_cache_dir, parse_ttl, TtlRules};
use crate::error::{EpicstampError, Result};
use crate::template::default_templates_dir;

/// Top-level settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where templates are stored.
    pub templates_dir: Option<PathBuf>,

    /// Cache behavior.
    pub cache: CacheSettings,
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Write entries through to disk for warm starts.
    pub persist: bool,

    /// Where persisted entries live.
    pub dir: Option<PathBuf>,

    /// TTL for keys matching no rule, e.g. "5m".
    pub default_ttl: Option<String>,

    /// Replaces the standard rules when present.
    pub rules: Option<Vec<TtlRuleSettings>>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            persist: true,
            dir: None,
            default_ttl: None,
            rules: None,
        }
    }
}

/// One `pattern -> ttl` rule as written in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtlRuleSettings {
    pub pattern: String,
    pub ttl: String,
}

fn ttl_setting(what: &str, value: &str) -> Result<chrono::Duration> {
    parse_ttl(value).map_err(|e| EpicstampError::ConfigValidationError {
        message: format!("invalid {} '{}': {}", what, value, e),
    })
}

impl Settings {
    /// Template directory, falling back to the platform data dir.
    pub fn templates_dir(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(default_templates_dir)
    }

    /// Cache directory, falling back to the platform cache dir.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Build TTL rules from the cache settings.
    ///
    /// Unset fields keep the values from [`TtlRules::standard`].
    pub fn cache_rules(&self) -> Result<TtlRules> {
        let mut rules = TtlRules::standard();

        if let Some(default_ttl) = &self.cache.default_ttl {
            rules.default_ttl = ttl_setting("default_ttl", default_ttl)?;
        }

        if let Some(configured) = &self.cache.rules {
            rules.rules = Vec::with_capacity(configured.len());
            for rule in configured {
                if rule.pattern.is_empty() {
                    return Err(EpicstampError::ConfigValidationError {
                        message: "cache rule pattern must not be empty".to_string(),
                    });
                }
                let ttl = ttl_setting(&format!("ttl for '{}'", rule.pattern), &rule.ttl)?;
                rules = rules.with_rule(rule.pattern.clone(), ttl);
            }
        }

        Ok(rules)
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        self.cache_rules().map(|_| ())
    }
}
