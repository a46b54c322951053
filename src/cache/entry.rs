//! Cache entry type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached payload with its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cache key, e.g. "workflows" or "members:team-1".
    pub key: String,
    /// Opaque payload.
    pub payload: serde_json::Value,
    /// When this entry was stored.
    pub created_at: DateTime<Utc>,
    /// First instant at which the entry is no longer readable.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stored at `now` that lives for `ttl`.
    ///
    /// Expiry saturates at the latest representable instant.
    pub fn new(
        key: impl Into<String>,
        payload: serde_json::Value,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expires_at = now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });

        Self {
            key: key.into(),
            payload,
            created_at: now,
            expires_at,
        }
    }

    /// Whether the entry has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, never negative.
    pub fn remaining_ttl_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at
            .signed_duration_since(now)
            .max(Duration::zero())
    }

    /// Age of this entry at `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Approximate payload size in bytes (serialized JSON).
    pub fn size_bytes(&self) -> usize {
        serde_json::to_vec(&self.payload)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn entry_creation() {
        let entry = CacheEntry::new("workflows", json!([1, 2]), at(0), Duration::seconds(60));
        assert_eq!(entry.key, "workflows");
        assert_eq!(entry.created_at, at(0));
        assert_eq!(entry.expires_at, at(60_000));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let entry = CacheEntry::new("k", json!(null), at(0), Duration::milliseconds(100));
        assert!(!entry.is_expired_at(at(99)));
        assert!(entry.is_expired_at(at(100)));
        assert!(entry.is_expired_at(at(101)));
    }

    #[test]
    fn remaining_ttl_clamps_at_zero() {
        let entry = CacheEntry::new("k", json!(null), at(0), Duration::seconds(10));
        assert_eq!(entry.remaining_ttl_at(at(4_000)), Duration::seconds(6));
        assert_eq!(entry.remaining_ttl_at(at(20_000)), Duration::zero());
    }

    #[test]
    fn age_since_creation() {
        let entry = CacheEntry::new("k", json!(null), at(0), Duration::seconds(10));
        assert_eq!(entry.age_at(at(2_500)), Duration::milliseconds(2_500));
    }

    #[test]
    fn size_is_serialized_length() {
        let entry = CacheEntry::new("k", json!("abc"), at(0), Duration::seconds(1));
        assert_eq!(entry.size_bytes(), 5);
    }

    #[test]
    fn huge_ttl_saturates_expiry() {
        let entry = CacheEntry::new("k", json!(1), at(0), Duration::days(100_000_000));
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!entry.is_expired_at(at(3600)));
    }

    #[test]
    fn entry_serializes() {
        let entry = CacheEntry::new("members", json!({"id": 1}), at(0), Duration::seconds(1));
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
