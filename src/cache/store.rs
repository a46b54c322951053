//! The in-process expiring cache.
//!
//! [`ExpiringCache`] memoizes API responses with a per-key TTL chosen by
//! [`TtlRules`]. Expired entries are evicted lazily when read; nothing sweeps
//! in the background, so [`ExpiringCache::clear`] is the only way to reclaim
//! entries that are never read again.
//!
//! # Persistence
//!
//! With a [`CacheBackend`] attached, every `set` also queues the entry for a
//! dedicated writer thread. `set` returns before the write happens and write
//! failures are only logged. Dropping the cache waits for queued writes.
//!
//! # Example
//!
//! ```
//! use epicstamp::cache::{ExpiringCache, TtlRules};
//! use serde_json::json;
//!
//! let cache = ExpiringCache::new(TtlRules::standard());
//! cache.set("workflows", json!([{"id": 1}]), None);
//! cache.set("members:1", json!({"name": "Ada"}), None);
//!
//! cache.invalidate("workflows");
//! assert!(cache.get("workflows").is_none());
//! assert!(cache.get("members:1").is_some());
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use super::backend::CacheBackend;
use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use super::ttl::TtlRules;

/// Counts for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries held in memory, expired or not.
    pub entries: usize,
    /// Entries that would hit on `get`.
    pub fresh: usize,
    /// Entries past expiry that have not been read since.
    pub expired: usize,
    /// Serialized payload bytes across all entries.
    pub total_bytes: usize,
}

/// Background writer for a backend.
struct PersistWorker {
    tx: Option<Sender<CacheEntry>>,
    handle: Option<JoinHandle<()>>,
}

impl PersistWorker {
    fn spawn(backend: Arc<dyn CacheBackend>) -> Option<Self> {
        let (tx, rx) = mpsc::channel::<CacheEntry>();
        let spawned = thread::Builder::new()
            .name("epicstamp-cache-persist".into())
            .spawn(move || {
                for entry in rx {
                    if let Err(e) = backend.write(&entry) {
                        tracing::warn!("Failed to persist cache entry '{}': {:#}", entry.key, e);
                    }
                }
            });

        match spawned {
            Ok(handle) => Some(Self {
                tx: Some(tx),
                handle: Some(handle),
            }),
            Err(e) => {
                tracing::warn!("Cache persistence disabled, writer thread failed: {}", e);
                None
            }
        }
    }

    fn submit(&self, entry: CacheEntry) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.send(entry) {
                tracing::warn!("Cache persistence writer gone, dropping '{}'", e.0.key);
            }
        }
    }
}

impl Drop for PersistWorker {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop once the queue drains.
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Cache persistence writer panicked");
            }
        }
    }
}

/// In-memory key-value cache with per-key expiry.
pub struct ExpiringCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    rules: TtlRules,
    clock: Arc<dyn Clock>,
    backend: Option<Arc<dyn CacheBackend>>,
    worker: Option<PersistWorker>,
}

impl ExpiringCache {
    /// Create a memory-only cache using the system clock.
    pub fn new(rules: TtlRules) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            rules,
            clock: Arc::new(SystemClock),
            backend: None,
            worker: None,
        }
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Write entries through to `backend` in the background.
    pub fn with_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.worker = PersistWorker::spawn(Arc::clone(&backend));
        self.backend = Some(backend);
        self
    }

    /// The TTL rules in use.
    pub fn rules(&self) -> &TtlRules {
        &self.rules
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // No operation leaves the map half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a payload.
    ///
    /// An expired entry is evicted and reported as a miss. Reading never
    /// extends an entry's life.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let Some(entry) = entries.get(key) else {
            tracing::debug!("Cache miss: {}", key);
            return None;
        };

        if !entry.is_expired_at(now) {
            tracing::debug!("Cache hit: {}", key);
            return Some(entry.payload.clone());
        }

        entries.remove(key);
        tracing::debug!("Cache expired: {}", key);
        None
    }

    /// Look up a payload and deserialize it.
    ///
    /// A payload that does not deserialize as `T` is treated as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::debug!("Cache entry '{}' has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Store a payload, replacing any existing entry for the key.
    ///
    /// Without an explicit `ttl` the key is classified by the TTL rules.
    pub fn set(&self, key: impl Into<String>, payload: serde_json::Value, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or_else(|| self.rules.classify(&key));
        let entry = CacheEntry::new(key.clone(), payload, self.clock.now(), ttl);

        // Submitting under the lock keeps disk order equal to memory order.
        let mut entries = self.lock();
        if let Some(worker) = &self.worker {
            worker.submit(entry.clone());
        }
        entries.insert(key, entry);
    }

    /// Serialize a value and store it.
    pub fn set_as<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<Duration>,
    ) -> serde_json::Result<()> {
        let payload = serde_json::to_value(value)?;
        self.set(key, payload, ttl);
        Ok(())
    }

    /// Return the cached payload, or fetch, store and return it.
    ///
    /// Fetch errors are returned as-is and nothing is stored.
    pub fn get_or_fetch<F, E>(&self, key: &str, fetch: F) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Result<serde_json::Value, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = fetch()?;
        self.set(key, value.clone(), None);
        Ok(value)
    }

    /// Remove every key containing `pattern`. Returns how many were removed.
    ///
    /// An empty pattern removes nothing; use [`ExpiringCache::clear`] for that.
    pub fn invalidate(&self, pattern: &str) -> usize {
        if pattern.is_empty() {
            return 0;
        }

        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        let removed = before - entries.len();

        tracing::debug!("Invalidated {} cache entries matching '{}'", removed, pattern);
        removed
    }

    /// Remove a single entry. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry from memory.
    ///
    /// The backend is left untouched; clear it directly if needed.
    pub fn clear(&self) {
        self.lock().clear();
        tracing::debug!("Cache cleared");
    }

    /// All keys currently held, sorted. Includes expired entries not yet read.
    pub fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Snapshot of all entries, sorted by key. Does not evict.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self.lock().values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts for diagnostics. Does not evict.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();
        let expired = entries.values().filter(|e| e.is_expired_at(now)).count();

        CacheStats {
            entries: entries.len(),
            fresh: entries.len() - expired,
            expired,
            total_bytes: entries.values().map(CacheEntry::size_bytes).sum(),
        }
    }

    /// Load unexpired entries from the backend.
    ///
    /// Entries already in memory are kept. Returns how many were loaded;
    /// backend errors are logged and count as zero.
    pub fn warm_start(&self) -> usize {
        let Some(backend) = &self.backend else {
            return 0;
        };

        let persisted = match backend.load_all() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to load persisted cache: {:#}", e);
                return 0;
            }
        };

        let now = self.clock.now();
        let mut entries = self.lock();
        let mut loaded = 0;
        for entry in persisted {
            if entry.is_expired_at(now) || entries.contains_key(&entry.key) {
                continue;
            }
            entries.insert(entry.key.clone(), entry);
            loaded += 1;
        }

        tracing::debug!("Warm-started cache with {} entries", loaded);
        loaded
    }
}

impl Default for ExpiringCache {
    fn default() -> Self {
        Self::new(TtlRules::standard())
    }
}
