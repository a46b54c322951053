//! Template ID generation and parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique template identifier.
///
/// Format: `tpl_{timestamp_ms}_{random_hex}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId {
    timestamp: DateTime<Utc>,
    random: [u8; 8],
}

impl TemplateId {
    /// Generate a new template ID.
    pub fn new() -> Self {
        let now = Utc::now();
        let mut random = [0u8; 8];
        if getrandom::getrandom(&mut random).is_err() {
            // No entropy source; the nanosecond clock still keeps ids distinct.
            let nanos = now.timestamp_nanos_opt().unwrap_or_default();
            random = nanos.to_le_bytes();
        }

        // Truncate to milliseconds for consistent serialization
        let timestamp = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        Self { timestamp, random }
    }

    /// When the ID was generated.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Parse a template ID from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_prefix("tpl_")?;
        let (ts, random_hex) = s.split_once('_')?;

        let timestamp = DateTime::from_timestamp_millis(ts.parse().ok()?)?;
        let random_bytes = hex::decode(random_hex).ok()?;
        let random: [u8; 8] = random_bytes.try_into().ok()?;

        Some(Self { timestamp, random })
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tpl_{}_{}",
            self.timestamp.timestamp_millis(),
            hex::encode(self.random)
        )
    }
}

// Stored as its string form
impl Serialize for TemplateId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TemplateId::parse(&s).ok_or_else(|| serde::de::Error::custom("Invalid template ID format"))
    }
}
