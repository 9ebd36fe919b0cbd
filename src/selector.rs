//! Deterministic selection of the day's items.
//!
//! No randomness and no dependence on input order: candidates are sorted by a
//! total key that always ends with the URL, then a fixed-size prefix is taken.

use crate::config::NewsletterConfig;
use crate::models::NewsItem;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Selection mode name that ranks purely by recency.
pub const MODE_TOP: &str = "top";

fn recency_desc(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| b.url.cmp(&a.url))
        .then_with(|| b.title.cmp(&a.title))
}

fn topic_desc(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.topic.cmp(&a.topic).then_with(|| recency_desc(a, b))
}

/// Pick the items for the issue.
///
/// - `top`: newest first, URL descending on ties, `max(per_bucket, total_fallback)` items.
/// - any other mode: topic descending, then as `top`, `per_bucket` items.
#[instrument(level = "info", skip_all, fields(mode = %cfg.mode, candidates = items.len()))]
pub fn select_items(mut items: Vec<NewsItem>, cfg: &NewsletterConfig) -> Vec<NewsItem> {
    let limit = if cfg.mode == MODE_TOP {
        items.sort_by(recency_desc);
        cfg.per_bucket.max(cfg.total_fallback)
    } else {
        items.sort_by(topic_desc);
        cfg.per_bucket
    };
    items.truncate(limit);
    debug!(selected = items.len(), limit, "Selected items");
    items
}
