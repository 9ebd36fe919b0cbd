//! The daily run: fetch, filter, dedup, skip seen, select, render, archive, record.
//!
//! At most one issue is generated per Warsaw calendar date: the existence of
//! `site/<date>.html` marks the day as done unless a forced run is requested.
//! Nothing is written until an issue has been selected, and the seen-cache is
//! only updated after every page has been rendered.

use crate::config::Config;
use crate::filters::{dedup, is_relevant};
use crate::outputs::html::{PageContext, ensure_stylesheet, issue_path, to_html_page, write_pages};
use crate::outputs::{archive, markdown};
use crate::seen::SeenCache;
use crate::selector::select_items;
use crate::sources::ItemSource;
use crate::utils::{ensure_dirs, issue_date, resolve_path};
use chrono::DateTime;
use chrono_tz::Tz;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Externally controlled switches, resolved by the caller (normally from the environment).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSwitches {
    /// Generate the issue even if today's page already exists.
    pub force_run: bool,
    /// Discard the seen-cache before using it.
    pub reset_cache: bool,
}

/// Files written for a published issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub date: String,
    pub markdown_path: PathBuf,
    pub html_path: PathBuf,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Today's issue exists and no forced run was requested.
    AlreadyPublished { date: String },
    /// Filtering left nothing to publish; no output was written.
    NothingSelected { date: String },
    Published(Issue),
}

/// Run the digest once for the date of `now`.
#[instrument(level = "info", skip_all, fields(root = %root.display(), force_run = switches.force_run, reset_cache = switches.reset_cache))]
pub async fn run_daily<S: ItemSource>(
    config: &Config,
    root: &Path,
    now: &DateTime<Tz>,
    switches: RunSwitches,
    source: &S,
) -> Result<RunOutcome, Box<dyn Error>> {
    ensure_dirs(root).await?;
    let date = issue_date(now);
    let site_dir = root.join("site");

    let marker = issue_path(&site_dir, &date);
    if !switches.force_run && fs::try_exists(&marker).await? {
        info!(%date, path = %marker.display(), "Today's issue already exists; nothing to do");
        return Ok(RunOutcome::AlreadyPublished { date });
    }

    let fetched = source.fetch(now).await;
    let fetched_count = fetched.len();
    let relevant: Vec<_> = fetched.into_iter().filter(is_relevant).collect();
    let relevant_count = relevant.len();
    let unique = dedup(relevant);
    info!(
        fetched = fetched_count,
        relevant = relevant_count,
        unique = unique.len(),
        "Filtered items"
    );

    let seen_path = resolve_path(root, &config.seen_cache.path);
    let mut seen = SeenCache::load(&seen_path, now, config.seen_cache.ttl_days, switches.reset_cache).await;
    let candidates = seen.filter_unseen(unique);
    info!(candidates = candidates.len(), seen = seen.len(), "Skipped already published items");

    let selected = select_items(candidates.clone(), &config.newsletter);
    if selected.is_empty() {
        warn!(%date, "No items selected; aborting without writing outputs");
        return Ok(RunOutcome::NothingSelected { date });
    }

    let markdown_path = markdown::write_markdown(&root.join("out"), &date, &selected).await?;
    let page = to_html_page(&PageContext {
        date: &date,
        title: &config.html.title,
        banner: &config.html.banner_text,
        items: &selected,
        footer_links: &config.html.footer_links,
    });
    let html_path = write_pages(&site_dir, &date, &page).await?;
    ensure_stylesheet(&site_dir).await?;
    archive::update_archive(&site_dir, &date, &config.html.title).await?;

    let recorded = if config.seen_cache.record_only_published {
        &selected
    } else {
        &candidates
    };
    seen.record(recorded, now);
    seen.persist().await?;

    info!(
        %date,
        items = selected.len(),
        markdown = %markdown_path.display(),
        html = %html_path.display(),
        "Published issue"
    );
    Ok(RunOutcome::Published(Issue {
        date,
        markdown_path,
        html_path,
        item_count: selected.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsItem;
    use chrono::TimeZone;
    use chrono_tz::Europe::Warsaw;

    struct StaticSource(Vec<NewsItem>);

    impl ItemSource for StaticSource {
        async fn fetch(&self, _now: &DateTime<Tz>) -> Vec<NewsItem> {
            self.0.clone()
        }
    }

    fn item(title: &str, url: &str, published_at: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: "Wiadomość o AI".to_string(),
            url: url.to_string(),
            source: "Test".to_string(),
            published_at: published_at.to_string(),
            topic: "Ogólne".to_string(),
        }
    }

    fn sample() -> Vec<NewsItem> {
        vec![
            item("B", "https://example.pl/b", "2024-01-01T10:00:00+01:00"),
            item("A", "https://example.pl/a", "2024-01-01T09:00:00+01:00"),
            item("C", "https://example.pl/c", "2024-01-01T09:00:00+01:00"),
            item("C duplikat", "https://example.pl/c/?ref=x", "2024-01-01T11:00:00+01:00"),
            NewsItem {
                summary: "Promocja w sklepie".to_string(),
                ..item("Kupon rabaty", "https://shop.example/x", "2024-01-01T11:30:00+01:00")
            },
        ]
    }

    fn config(per_bucket: usize) -> Config {
        let mut config = Config::default();
        config.newsletter.per_bucket = per_bucket;
        config.newsletter.total_fallback = 0;
        config
    }

    fn now() -> DateTime<Tz> {
        Warsaw.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    async fn read(path: PathBuf) -> String {
        tokio::fs::read_to_string(path).await.unwrap()
    }

    #[tokio::test]
    async fn test_publishes_issue() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource(sample());
        let outcome = run_daily(&config(2), dir.path(), &now(), RunSwitches::default(), &source)
            .await
            .unwrap();

        let RunOutcome::Published(issue) = outcome else {
            panic!("expected a published issue, got {outcome:?}");
        };
        assert_eq!(issue.date, "2024-01-01");
        assert_eq!(issue.item_count, 2);

        let md = read(dir.path().join("out/2024-01-01_ALL.md")).await;
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("- **B**"));
        assert!(lines[1].starts_with("- **C**"));
        assert!(!md.contains("Kupon"));

        let page = read(dir.path().join("site/2024-01-01.html")).await;
        assert_eq!(page, read(dir.path().join("site/index.html")).await);
        assert!(read(dir.path().join("site/archive.html")).await.contains("2024-01-01.html"));
        assert!(dir.path().join("site/assets/custom.css").exists());

        let seen = SeenCache::load(&dir.path().join("data/seen.json"), &now(), 14, false).await;
        assert!(seen.contains("https://example.pl/b"));
        assert!(seen.contains("https://example.pl/c"));
        assert!(!seen.contains("https://example.pl/a"));
    }

    #[tokio::test]
    async fn test_second_run_same_day_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(2);
        run_daily(&cfg, dir.path(), &now(), RunSwitches::default(), &StaticSource(sample()))
            .await
            .unwrap();
        let archive_before = read(dir.path().join("site/archive.html")).await;
        let index_before = read(dir.path().join("site/index.html")).await;
        let seen_before = read(dir.path().join("data/seen.json")).await;

        let other = StaticSource(vec![item("Nowe", "https://example.pl/new", "2024-01-01T11:59:00+01:00")]);
        let later = Warsaw.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        let outcome = run_daily(&cfg, dir.path(), &later, RunSwitches::default(), &other)
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::AlreadyPublished { date: "2024-01-01".to_string() });

        assert_eq!(read(dir.path().join("site/archive.html")).await, archive_before);
        assert_eq!(read(dir.path().join("site/index.html")).await, index_before);
        assert_eq!(read(dir.path().join("data/seen.json")).await, seen_before);
    }

    #[tokio::test]
    async fn test_forced_rerun_skips_seen_items() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(2);
        run_daily(&cfg, dir.path(), &now(), RunSwitches::default(), &StaticSource(sample()))
            .await
            .unwrap();

        let force = RunSwitches { force_run: true, reset_cache: false };
        let outcome = run_daily(&cfg, dir.path(), &now(), force, &StaticSource(sample()))
            .await
            .unwrap();
        let RunOutcome::Published(issue) = outcome else {
            panic!("expected a published issue, got {outcome:?}");
        };
        // B and C were published already; only A is left.
        assert_eq!(issue.item_count, 1);
        assert!(read(issue.markdown_path).await.starts_with("- **A**"));

        let archive = read(dir.path().join("site/archive.html")).await;
        assert_eq!(archive.matches("2024-01-01.html").count(), 1);
    }

    #[tokio::test]
    async fn test_reset_allows_republishing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(2);
        run_daily(&cfg, dir.path(), &now(), RunSwitches::default(), &StaticSource(sample()))
            .await
            .unwrap();

        let switches = RunSwitches { force_run: true, reset_cache: true };
        let outcome = run_daily(&cfg, dir.path(), &now(), switches, &StaticSource(sample()))
            .await
            .unwrap();
        let RunOutcome::Published(issue) = outcome else {
            panic!("expected a published issue, got {outcome:?}");
        };
        assert_eq!(issue.item_count, 2);
        assert!(read(issue.markdown_path).await.starts_with("- **B**"));
    }

    #[tokio::test]
    async fn test_empty_selection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let noise = StaticSource(vec![NewsItem {
            summary: "sklep".to_string(),
            ..item("Kupon", "https://shop.example/x", "2024-01-01T10:00:00+01:00")
        }]);
        let outcome = run_daily(&config(2), dir.path(), &now(), RunSwitches::default(), &noise)
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::NothingSelected { date: "2024-01-01".to_string() });

        assert!(!dir.path().join("site/2024-01-01.html").exists());
        assert!(!dir.path().join("site/index.html").exists());
        assert!(!dir.path().join("site/archive.html").exists());
        assert!(!dir.path().join("out/2024-01-01_ALL.md").exists());
        assert!(!dir.path().join("data/seen.json").exists());
    }

    #[tokio::test]
    async fn test_records_all_candidates_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(1);
        cfg.seen_cache.record_only_published = false;
        run_daily(&cfg, dir.path(), &now(), RunSwitches::default(), &StaticSource(sample()))
            .await
            .unwrap();

        let seen = SeenCache::load(&dir.path().join("data/seen.json"), &now(), 14, false).await;
        for url in ["https://example.pl/a", "https://example.pl/b", "https://example.pl/c"] {
            assert!(seen.contains(url), "{url} not recorded");
        }
        assert!(!seen.contains("https://shop.example/x"));
    }

    #[tokio::test]
    async fn test_next_day_prepends_archive_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(1);
        run_daily(&cfg, dir.path(), &now(), RunSwitches::default(), &StaticSource(sample()))
            .await
            .unwrap();
        let tomorrow = Warsaw.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        run_daily(&cfg, dir.path(), &tomorrow, RunSwitches::default(), &StaticSource(sample()))
            .await
            .unwrap();

        let archive = read(dir.path().join("site/archive.html")).await;
        let newer = archive.find("2024-01-02.html").unwrap();
        let older = archive.find("2024-01-01.html").unwrap();
        assert!(newer < older);
        assert!(read(dir.path().join("site/index.html")).await.contains("2024-01-02"));
    }
}
