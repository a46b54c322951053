//! Cache command implementation.
//!
//! Provides `epicstamp cache list`, `epicstamp cache clear`, etc. The cache is
//! warm-started from its persisted entries so each invocation sees what
//! earlier ones stored.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::sync::Arc;

use crate::cache::{format_duration, parse_ttl, CacheBackend, ExpiringCache, FileBackend};
use crate::config::Settings;
use crate::error::Result;
use crate::ui::{Prompt, PromptResult, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a cached payload.
    Get {
        /// Cache key.
        key: String,
    },
    /// Store a payload. Values that are not valid JSON are stored as strings.
    Set {
        /// Cache key.
        key: String,
        /// Payload.
        value: String,
        /// Lifetime such as 90s, 5m or 1h. Defaults to the key's TTL class.
        #[arg(long)]
        ttl: Option<String>,
    },
    /// Drop every entry whose key contains a pattern.
    Invalidate {
        /// Substring to match.
        pattern: String,
    },
    /// Drop one entry.
    Remove {
        /// Cache key.
        key: String,
    },
    /// Clear the cache.
    Clear {
        /// Also delete persisted entries.
        #[arg(long)]
        persisted: bool,
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
    /// Show cache statistics.
    Stats,
}

/// The cache command implementation.
pub struct CacheCommand {
    cache: ExpiringCache,
    backend: Arc<FileBackend>,
    persist: bool,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a cache command from settings, warm-starting from disk when
    /// persistence is enabled.
    pub fn new(settings: &Settings, args: CacheArgs) -> Result<Self> {
        let rules = settings.cache_rules()?;
        let backend = Arc::new(FileBackend::new(settings.cache_dir()));
        let persist = settings.cache.persist;

        let mut cache = ExpiringCache::new(rules);
        if persist {
            cache = cache.with_backend(backend.clone());
            let loaded = cache.warm_start();
            tracing::debug!("Loaded {} cached entries from {:?}", loaded, backend.root());
        }

        Ok(Self {
            cache,
            backend,
            persist,
            args,
        })
    }

    /// Drop persisted copies of keys removed from memory.
    fn forget_persisted<'a>(&self, keys: impl IntoIterator<Item = &'a String>) -> Result<()> {
        if !self.persist {
            return Ok(());
        }
        for key in keys {
            self.backend.remove(key)?;
        }
        Ok(())
    }

    fn list(&self, json: bool, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let entries = self.cache.entries();

        if json {
            let output =
                serde_json::to_string_pretty(&entries).context("Failed to serialize entries")?;
            ui.message(&output);
            return Ok(CommandResult::success());
        }

        if entries.is_empty() {
            ui.message("Cache is empty");
            return Ok(CommandResult::success());
        }

        let now = self.cache.now();
        let mut table = Table::new(&["Key", "Status", "Expires in", "Size"]);
        for entry in &entries {
            let (status, ttl) = if entry.is_expired_at(now) {
                ("expired", "-".to_string())
            } else {
                ("fresh", format_duration(entry.remaining_ttl_at(now)))
            };
            table.add_row(vec![
                entry.key.clone(),
                status.to_string(),
                ttl,
                format!("{} B", entry.size_bytes()),
            ]);
        }
        ui.message(&table.render());
        Ok(CommandResult::success())
    }

    fn get(&self, key: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match self.cache.get(key) {
            Some(payload) => {
                let output =
                    serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?;
                ui.message(&output);
                Ok(CommandResult::success())
            }
            None => {
                ui.warning(&format!("Not cached: {}", key));
                Ok(CommandResult::failure(1))
            }
        }
    }

    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<&str>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let ttl = ttl.map(parse_ttl).transpose()?;
        let payload = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

        let lifetime = ttl.unwrap_or_else(|| self.cache.rules().classify(key));
        self.cache.set(key, payload, ttl);
        ui.success(&format!("Cached '{}' for {}", key, format_duration(lifetime)));
        Ok(CommandResult::success())
    }

    fn invalidate(&self, pattern: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let matching: Vec<String> = if pattern.is_empty() {
            Vec::new()
        } else {
            self.cache
                .list_keys()
                .into_iter()
                .filter(|key| key.contains(pattern))
                .collect()
        };

        let removed = self.cache.invalidate(pattern);
        self.forget_persisted(&matching)?;
        ui.success(&format!("Invalidated {} entries matching '{}'", removed, pattern));
        Ok(CommandResult::success())
    }

    fn remove(&self, key: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let in_memory = self.cache.remove(key);
        let on_disk = self.persist && self.backend.remove(key)?;

        if in_memory || on_disk {
            ui.success(&format!("Removed '{}'", key));
        } else {
            ui.warning(&format!("Not cached: {}", key));
        }
        Ok(CommandResult::success())
    }

    fn clear(
        &self,
        persisted: bool,
        force: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let count = self.cache.len();
        if count == 0 && !persisted {
            ui.message("Cache is already empty");
            return Ok(CommandResult::success());
        }

        if !force && ui.is_interactive() {
            let what = if persisted {
                "all cached and persisted entries"
            } else {
                "all cached entries"
            };
            let prompt = Prompt::confirm("clear_cache", format!("Clear {}?", what))
                .with_default("false");

            if ui.prompt(&prompt)? != PromptResult::Bool(true) {
                ui.message("Cancelled");
                return Ok(CommandResult::success());
            }
        }

        let keys = self.cache.list_keys();
        self.cache.clear();
        if persisted {
            let removed = self.backend.clear()?;
            ui.success(&format!("Cleared {} persisted entries", removed));
        } else {
            self.forget_persisted(&keys)?;
            ui.success(&format!("Cleared {} entries", count));
        }
        Ok(CommandResult::success())
    }

    fn stats(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let stats = self.cache.stats();
        let rules = self.cache.rules();

        ui.show_header("Cache Statistics");
        ui.message(&format!("Total entries: {}", stats.entries));
        ui.message(&format!("Fresh: {}", stats.fresh));
        ui.message(&format!("Expired: {}", stats.expired));
        ui.message(&format!("Total size: {} bytes", stats.total_bytes));
        ui.message(&format!(
            "Persistence: {}",
            if self.persist { "on" } else { "off" }
        ));
        ui.message(&format!("Location: {}", self.backend.root().display()));
        ui.message(&format!("Default TTL: {}", format_duration(rules.default_ttl)));
        for rule in &rules.rules {
            ui.message(&format!("  {} -> {}", rule.pattern, format_duration(rule.ttl)));
        }
        Ok(CommandResult::success())
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            CacheSubcommand::List { json } => self.list(*json, ui),
            CacheSubcommand::Get { key } => self.get(key, ui),
            CacheSubcommand::Set { key, value, ttl } => self.set(key, value, ttl.as_deref(), ui),
            CacheSubcommand::Invalidate { pattern } => self.invalidate(pattern, ui),
            CacheSubcommand::Remove { key } => self.remove(key, ui),
            CacheSubcommand::Clear { persisted, force } => self.clear(*persisted, *force, ui),
            CacheSubcommand::Stats => self.stats(ui),
        }
    }
}
