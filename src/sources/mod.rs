//! The fetch layer: where the day's raw items come from.
//!
//! Two sources exist, tried in order:
//!
//! | Source | Module | Used when |
//! |--------|--------|-----------|
//! | Live RSS feeds | [`rss`] | `sources.live_enabled` |
//! | Curated JSON file | [`curated`] | live produced nothing and `sources.curated_first` |
//!
//! Everything leaving this module is a normalized [`NewsItem`] with a
//! canonical, non-empty URL.
//!
//! The orchestrator only sees the [`ItemSource`] trait, so runs can be driven
//! by an in-memory source.

pub mod curated;
pub mod rss;

use crate::canonical::canonicalize_url;
use crate::config::Config;
use crate::models::{CuratedItem, DEFAULT_TOPIC, NewsItem};
use crate::utils::resolve_path;
use chrono::DateTime;
use chrono_tz::Tz;
use std::path::PathBuf;
use tracing::{info, instrument};

const UNKNOWN_SOURCE: &str = "unknown";

/// Anything that can produce the day's candidate items.
pub trait ItemSource {
    /// Fetch normalized items as of `now`. Failures degrade to fewer (or no) items.
    async fn fetch(&self, now: &DateTime<Tz>) -> Vec<NewsItem>;
}

/// Live feeds with the curated file as fallback, as configured.
#[derive(Debug, Clone)]
pub struct FeedSource {
    live_enabled: bool,
    curated_first: bool,
    feeds: Vec<String>,
    window_hours: i64,
    curated_path: PathBuf,
}

impl FeedSource {
    pub fn from_config(config: &Config, root: &std::path::Path) -> Self {
        let feeds = if config.sources.feeds.is_empty() {
            rss::default_feeds()
        } else {
            config.sources.feeds.clone()
        };
        FeedSource {
            live_enabled: config.sources.live_enabled,
            curated_first: config.sources.curated_first,
            feeds,
            window_hours: config.time.window_hours,
            curated_path: resolve_path(root, &config.sources.curated_path),
        }
    }
}

impl ItemSource for FeedSource {
    #[instrument(level = "info", skip_all)]
    async fn fetch(&self, now: &DateTime<Tz>) -> Vec<NewsItem> {
        let mut items = Vec::new();
        if self.live_enabled {
            items = rss::fetch_all(&self.feeds, now, self.window_hours).await;
        }
        if items.is_empty() && self.curated_first {
            info!(path = %self.curated_path.display(), "No live items; using curated file");
            items = normalize(curated::load_curated(&self.curated_path).await, now);
        }
        info!(count = items.len(), "Fetched candidate items");
        items
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn loosely shaped records into [`NewsItem`]s.
///
/// Strings are trimmed, URLs canonicalized, records without a URL dropped, and
/// missing `source`, `published_at` and `topic` filled with defaults.
pub fn normalize(items: Vec<CuratedItem>, now: &DateTime<Tz>) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter_map(|item| {
            let url = canonicalize_url(trimmed(item.url)?.as_str());
            Some(NewsItem {
                title: trimmed(item.title).unwrap_or_default(),
                summary: trimmed(item.summary).unwrap_or_default(),
                url,
                source: trimmed(item.source).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
                published_at: trimmed(item.published_at).unwrap_or_else(|| now.to_rfc3339()),
                topic: trimmed(item.topic).unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
            })
        })
        .collect()
}
