//! The seen-cache: canonical URLs that were already published, with expiry.
//!
//! Stored as a flat, human-readable JSON object in `data/seen.json`:
//!
//! ```text
//! {
//!   "https://example.pl/ai": { "ts": 1704100000.0 }
//! }
//! ```
//!
//! Lifecycle within one run: [`SeenCache::load`] (optionally reset, then
//! TTL-pruned), [`SeenCache::filter_unseen`] before selection,
//! [`SeenCache::record`] after rendering, and finally [`SeenCache::persist`]
//! with an atomic replace. The clock is always passed in by the caller.

use crate::models::{NewsItem, SeenEntry};
use crate::utils::{epoch_seconds, read_json_or, write_json_atomic};
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone)]
pub struct SeenCache {
    path: PathBuf,
    entries: BTreeMap<String, SeenEntry>,
}

impl SeenCache {
    /// Load the cache from `path`.
    ///
    /// A missing or malformed file is an empty cache. When `reset` is set the
    /// stored entries are discarded. Entries older than `ttl_days` relative to
    /// `now` are pruned; `ttl_days == 0` keeps everything.
    #[instrument(level = "info", skip_all, fields(path = %path.display(), ttl_days = ttl_days, reset = reset))]
    pub async fn load(path: &Path, now: &DateTime<Tz>, ttl_days: u64, reset: bool) -> SeenCache {
        let mut cache = SeenCache {
            path: path.to_path_buf(),
            entries: read_json_or(path, BTreeMap::new()).await,
        };
        let loaded = cache.entries.len();

        if reset {
            info!(discarded = loaded, "Seen-cache reset requested");
            cache.entries.clear();
        }
        let pruned = cache.prune(now, ttl_days);
        info!(loaded, pruned, kept = cache.entries.len(), "Loaded seen-cache");
        cache
    }

    /// Drop entries recorded more than `ttl_days` before `now`. Returns how many were removed.
    pub fn prune(&mut self, now: &DateTime<Tz>, ttl_days: u64) -> usize {
        if ttl_days == 0 {
            return 0;
        }
        let cutoff = epoch_seconds(now) - ttl_days as f64 * SECONDS_PER_DAY;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.timestamp >= cutoff);
        before - self.entries.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Keep the items whose URL has not been published yet, preserving order.
    pub fn filter_unseen(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        items
            .into_iter()
            .filter(|item| !self.contains(&item.url))
            .collect()
    }

    /// Stamp every item's URL with `now`, overwriting older stamps.
    pub fn record(&mut self, items: &[NewsItem], now: &DateTime<Tz>) {
        let timestamp = epoch_seconds(now);
        for item in items {
            self.entries.insert(item.url.clone(), SeenEntry { timestamp });
        }
    }

    /// Atomically write the cache back to the path it was loaded from.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), entries = self.entries.len()))]
    pub async fn persist(&self) -> Result<(), Box<dyn Error>> {
        write_json_atomic(&self.path, &self.entries).await?;
        info!("Persisted seen-cache");
        Ok(())
    }
}
