//! TTL classification and duration parsing.
//!
//! Cache keys embed their resource family (`workflows`, `members`,
//! `iterations`, ...). [`TtlRules`] maps a key to a TTL by checking an
//! ordered list of substring rules; the first match wins.

use anyhow::{bail, Result};
use chrono::Duration;

/// A single `pattern -> ttl` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlRule {
    /// Substring matched against the cache key.
    pub pattern: String,
    /// TTL for keys containing `pattern`.
    pub ttl: Duration,
}

impl TtlRule {
    pub fn new(pattern: impl Into<String>, ttl: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            ttl,
        }
    }
}

/// Ordered TTL rules with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlRules {
    /// TTL for keys matching no rule.
    pub default_ttl: Duration,
    /// Rules evaluated top to bottom.
    pub rules: Vec<TtlRule>,
}

/// Resources that rarely change.
pub const STATIC_RESOURCES: &[&str] = &["workflows", "projects", "members", "epic-workflow"];

/// Resources that change during normal use.
pub const DYNAMIC_RESOURCES: &[&str] = &["iterations", "states", "labels"];

impl TtlRules {
    /// Rules with no patterns; every key gets `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            rules: Vec::new(),
        }
    }

    /// Static resources for 30 minutes, dynamic ones for 2 minutes,
    /// everything else for 5 minutes.
    pub fn standard() -> Self {
        let static_ttl = Duration::minutes(30);
        let dynamic_ttl = Duration::minutes(2);

        let rules = STATIC_RESOURCES
            .iter()
            .map(|p| TtlRule::new(*p, static_ttl))
            .chain(DYNAMIC_RESOURCES.iter().map(|p| TtlRule::new(*p, dynamic_ttl)))
            .collect();

        Self {
            default_ttl: Duration::minutes(5),
            rules,
        }
    }

    /// Append a rule after the existing ones.
    pub fn with_rule(mut self, pattern: impl Into<String>, ttl: Duration) -> Self {
        self.rules.push(TtlRule::new(pattern, ttl));
        self
    }

    /// TTL for a key.
    pub fn classify(&self, key: &str) -> Duration {
        self.rules
            .iter()
            .find(|rule| key.contains(rule.pattern.as_str()))
            .map(|rule| rule.ttl)
            .unwrap_or(self.default_ttl)
    }
}

impl Default for TtlRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parse a TTL string like "7d", "24h", "30m", "45s" or "500ms".
///
/// A bare number is seconds.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();

    let duration = if let Some(ms) = ttl.strip_suffix("ms") {
        Duration::try_milliseconds(ms.trim().parse()?)
    } else if let Some(days) = ttl.strip_suffix('d') {
        Duration::try_days(days.trim().parse()?)
    } else if let Some(hours) = ttl.strip_suffix('h') {
        Duration::try_hours(hours.trim().parse()?)
    } else if let Some(mins) = ttl.strip_suffix('m') {
        Duration::try_minutes(mins.trim().parse()?)
    } else if let Some(secs) = ttl.strip_suffix('s') {
        Duration::try_seconds(secs.trim().parse()?)
    } else {
        Duration::try_seconds(ttl.parse()?)
    };
    let Some(duration) = duration else {
        bail!("TTL out of range: {}", ttl);
    };

    if duration <= Duration::zero() {
        bail!("TTL must be positive: {}", ttl);
    }
    Ok(duration)
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else if secs >= 1 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.num_milliseconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_static_resources_get_long_ttl() {
        let rules = TtlRules::standard();
        assert_eq!(rules.classify("workflows"), Duration::minutes(30));
        assert_eq!(rules.classify("members:team-1"), Duration::minutes(30));
        assert_eq!(rules.classify("epic-workflow"), Duration::minutes(30));
    }

    #[test]
    fn standard_dynamic_resources_get_short_ttl() {
        let rules = TtlRules::standard();
        assert_eq!(rules.classify("iterations:current"), Duration::minutes(2));
        assert_eq!(rules.classify("labels"), Duration::minutes(2));
    }

    #[test]
    fn unmatched_keys_get_default() {
        let rules = TtlRules::standard();
        assert_eq!(rules.classify("search:stories"), Duration::minutes(5));
    }

    #[test]
    fn first_matching_rule_wins() {
        // "workflows:42:states" contains both a static and a dynamic pattern
        let rules = TtlRules::standard();
        assert_eq!(rules.classify("workflows:42:states"), Duration::minutes(30));

        let rules = TtlRules::new(Duration::seconds(1))
            .with_rule("states", Duration::seconds(10))
            .with_rule("workflows", Duration::seconds(20));
        assert_eq!(rules.classify("workflows:42:states"), Duration::seconds(10));
    }

    #[test]
    fn empty_rules_fall_back() {
        let rules = TtlRules::new(Duration::seconds(7));
        assert_eq!(rules.classify("anything"), Duration::seconds(7));
    }

    #[test]
    fn parse_ttl_units() {
        assert_eq!(parse_ttl("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_ttl("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_ttl("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_ttl("45s").unwrap(), Duration::seconds(45));
        assert_eq!(parse_ttl("500ms").unwrap(), Duration::milliseconds(500));
    }

    #[test]
    fn parse_ttl_no_suffix_is_seconds() {
        assert_eq!(parse_ttl("3600").unwrap(), Duration::seconds(3600));
    }

    #[test]
    fn parse_ttl_rejects_garbage_and_zero() {
        assert!(parse_ttl("soon").is_err());
        assert!(parse_ttl("0m").is_err());
        assert!(parse_ttl("").is_err());
    }

    #[test]
    fn parse_ttl_rejects_out_of_range() {
        let err = parse_ttl("99999999999999d").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_ttl("9999999999999999h").is_err());
        assert!(parse_ttl("100000000d").is_ok());
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(Duration::days(7)), "7d");
        assert_eq!(format_duration(Duration::hours(12)), "12h");
        assert_eq!(format_duration(Duration::minutes(30)), "30m");
        assert_eq!(format_duration(Duration::seconds(45)), "45s");
        assert_eq!(format_duration(Duration::milliseconds(250)), "250ms");
    }
}
