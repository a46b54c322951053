//! Persistent backing stores for the expiring cache.
//!
//! The in-memory cache is authoritative for the running process. A backend
//! only lets the next process start warm.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::entry::CacheEntry;

/// Storage the cache writes through to.
pub trait CacheBackend: Send + Sync {
    /// Persist an entry, replacing any previous one for the same key.
    fn write(&self, entry: &CacheEntry) -> Result<()>;

    /// Load every persisted entry, expired or not.
    fn load_all(&self) -> Result<Vec<CacheEntry>>;

    /// Remove one entry. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Remove every entry. Returns how many were removed.
    fn clear(&self) -> Result<usize>;
}

/// Stores each entry as a JSON file named by a hash of its key.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the backend root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory {:?}", self.root))
    }

    /// Get the file path for a key.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        let hash_str = hex::encode(&hash[..16]);
        self.root.join(hash_str).with_extension("json")
    }
}

impl CacheBackend for FileBackend {
    fn write(&self, entry: &CacheEntry) -> Result<()> {
        self.ensure_dir()?;

        let path = self.entry_path(&entry.key);
        let json = serde_json::to_string(entry)?;

        // Write then rename so a concurrent reader never sees half a file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }

            if let Ok(json) = fs::read_to_string(&path) {
                match serde_json::from_str::<CacheEntry>(&json) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => tracing::debug!("Ignoring corrupt cache file {:?}: {}", path, e),
                }
            }
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn clear(&self) -> Result<usize> {
        let entries = self.load_all()?;
        let mut removed = 0;
        for entry in entries {
            if self.remove(&entry.key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
