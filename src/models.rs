//! Data models shared by every stage of the digest pipeline.
//!
//! - [`NewsItem`]: a normalized news record, the unit that flows from the
//!   fetch layer through filtering and selection into the renderers
//! - [`CuratedItem`]: the loose shape accepted from `data/curated.json`
//! - [`SeenEntry`]: one record of the seen-cache file
//! - [`FooterLink`]: a `(label, url)` pair rendered in the page footer

use serde::{Deserialize, Serialize};

/// Topic assigned to items that do not carry one.
pub const DEFAULT_TOPIC: &str = "Ogólne";

/// A normalized news item.
///
/// Created by the fetch layer and treated as read-only afterwards. The `url`
/// is already canonical (see [`crate::canonical::canonicalize_url`]) and is
/// the identity key for dedup and the seen-cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    /// Headline as published by the source.
    pub title: String,
    /// Plain-text teaser, may be empty.
    pub summary: String,
    /// Canonical article URL.
    pub url: String,
    /// Human-readable source name (feed title or curated value).
    pub source: String,
    /// ISO-8601 publication timestamp in Europe/Warsaw.
    pub published_at: String,
    /// Topic bucket used by the segmented selection mode.
    pub topic: String,
}

/// A record as found in the curated fallback file.
///
/// Every field is optional; [`crate::sources::normalize`] fills the gaps and
/// drops records without a URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CuratedItem {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<String>,
    pub topic: Option<String>,
}

/// One seen-cache record, serialized as `{"ts": <epoch seconds>}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct SeenEntry {
    /// When the URL was recorded, in (possibly fractional) epoch seconds.
    #[serde(rename = "ts", default)]
    pub timestamp: f64,
}

/// A footer link, written in YAML as a two-element list: `["Label", "https://…"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FooterLink(pub String, pub String);

impl FooterLink {
    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn url(&self) -> &str {
        &self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_item_accepts_partial_records() {
        let json = r#"[{"url": "https://example.com/a"}, {"title": "Bez linku"}]"#;
        let items: Vec<CuratedItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url.as_deref(), Some("https://example.com/a"));
        assert!(items[0].title.is_none());
        assert!(items[1].url.is_none());
    }

    #[test]
    fn test_seen_entry_uses_ts_key() {
        let entry: SeenEntry = serde_json::from_str(r#"{"ts": 1704100000.5}"#).unwrap();
        assert_eq!(entry.timestamp, 1704100000.5);
        let out = serde_json::to_string(&SeenEntry { timestamp: 12.0 }).unwrap();
        assert_eq!(out, r#"{"ts":12.0}"#);
    }

    #[test]
    fn test_footer_link_from_yaml_pair() {
        let links: Vec<FooterLink> =
            serde_yaml::from_str("- [\"O nas\", \"https://example.com/o-nas\"]\n").unwrap();
        assert_eq!(links[0].label(), "O nas");
        assert_eq!(links[0].url(), "https://example.com/o-nas");
    }
}
