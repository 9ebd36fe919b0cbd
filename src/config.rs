//! YAML configuration for the digest.
//!
//! Every section and key has a default, so a partial `config.yaml` (or an
//! empty one) still loads. Recognized layout:
//!
//! ```yaml
//! sources:
//!   live_enabled: true
//!   curated_first: true
//!   curated_path: data/curated.json
//!   feeds: []            # empty means the built-in Google News feeds
//! time:
//!   window_hours: 24
//! newsletter:
//!   mode: top            # "top" or anything else for topic-segmented
//!   per_bucket: 5
//!   total_fallback: 10
//! seen_cache:
//!   path: data/seen.json
//!   ttl_days: 14
//!   allow_reset_env: RESET_SEEN
//!   record_only_published: true
//! guard:
//!   force_run_env: FORCE_RUN
//! html:
//!   title: Machine Cinema
//!   banner_text: AI News
//!   footer_links: [["Strona", "https://example.com"]]
//! email:
//!   subject_prefix: "[AI News]"
//!   subscribers_path: data/subscribers.txt
//! ```

use crate::models::FooterLink;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub time: TimeConfig,
    pub newsletter: NewsletterConfig,
    pub seen_cache: SeenCacheConfig,
    pub guard: GuardConfig,
    pub html: HtmlConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Pull items from the RSS feeds.
    pub live_enabled: bool,
    /// Fall back to the curated file when live fetching yields nothing.
    pub curated_first: bool,
    pub curated_path: String,
    /// Feed URLs to poll; empty selects [`crate::sources::rss::default_feeds`].
    pub feeds: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            live_enabled: true,
            curated_first: true,
            curated_path: "data/curated.json".to_string(),
            feeds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Only live items published within this many hours are kept.
    pub window_hours: i64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig { window_hours: 24 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    pub mode: String,
    pub per_bucket: usize,
    pub total_fallback: usize,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        NewsletterConfig {
            mode: "top".to_string(),
            per_bucket: 5,
            total_fallback: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeenCacheConfig {
    pub path: String,
    /// Entries older than this are pruned on load; `0` disables pruning.
    pub ttl_days: u64,
    /// Name of the environment variable that clears the cache when set to `1`.
    pub allow_reset_env: Option<String>,
    /// Record only the published items (`true`) or every candidate (`false`).
    pub record_only_published: bool,
}

impl Default for SeenCacheConfig {
    fn default() -> Self {
        SeenCacheConfig {
            path: "data/seen.json".to_string(),
            ttl_days: 14,
            allow_reset_env: Some("RESET_SEEN".to_string()),
            record_only_published: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Name of the environment variable that bypasses the daily guard when set to `1`.
    pub force_run_env: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            force_run_env: "FORCE_RUN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    pub title: String,
    pub banner_text: String,
    pub footer_links: Vec<FooterLink>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        HtmlConfig {
            title: "Machine Cinema".to_string(),
            banner_text: "Codzienny przegląd wiadomości o AI".to_string(),
            footer_links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub subject_prefix: String,
    pub subscribers_path: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            subject_prefix: "[Machine Cinema]".to_string(),
            subscribers_path: "data/subscribers.txt".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Config, Box<dyn Error>> {
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Load the configuration file at `path`.
///
/// Unlike the data files, a missing or malformed config is fatal: the run has
/// no meaningful defaults for where it should publish.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let config = Config::from_yaml(&text)?;
    info!(
        mode = %config.newsletter.mode,
        per_bucket = config.newsletter.per_bucket,
        live_enabled = config.sources.live_enabled,
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.newsletter.mode, "top");
        assert_eq!(config.seen_cache.path, "data/seen.json");
        assert_eq!(config.guard.force_run_env, "FORCE_RUN");
        assert!(config.sources.live_enabled);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let yaml = r#"
newsletter:
  mode: segments
  per_bucket: 3
seen_cache:
  ttl_days: 7
  allow_reset_env: RESET_CACHE
html:
  title: "Machine Cinema PL"
  footer_links:
    - ["Kontakt", "mailto:redakcja@example.com"]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.newsletter.mode, "segments");
        assert_eq!(config.newsletter.per_bucket, 3);
        assert_eq!(config.newsletter.total_fallback, 10);
        assert_eq!(config.seen_cache.ttl_days, 7);
        assert_eq!(config.seen_cache.allow_reset_env.as_deref(), Some("RESET_CACHE"));
        assert!(config.seen_cache.record_only_published);
        assert_eq!(config.html.title, "Machine Cinema PL");
        assert_eq!(config.html.footer_links.len(), 1);
        assert_eq!(config.time.window_hours, 24);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(Config::from_yaml("newsletter: [unclosed").is_err());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "sources:\n  live_enabled: false\n")
            .await
            .unwrap();
        let config = load_config(&path).await.unwrap();
        assert!(!config.sources.live_enabled);
        assert!(config.sources.curated_first);
    }

    #[tokio::test]
    async fn test_load_config_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.yaml")).await.is_err());
    }
}
