//! Markdown rendering of an issue.
//!
//! One bullet per item: bold title, summary, and a "Czytaj" link.

use crate::models::NewsItem;
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub fn to_markdown(items: &[NewsItem]) -> String {
    let mut md = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            md.push('\n');
        }
        write!(
            md,
            "- **{}** — {} [Czytaj]({})",
            item.title.trim(),
            item.summary.trim(),
            item.url
        )
        .unwrap();
    }
    md
}

/// Write `out/<date>_ALL.md` and return its path.
#[instrument(level = "info", skip_all, fields(date = %date, count = items.len()))]
pub async fn write_markdown(
    out_dir: &Path,
    date: &str,
    items: &[NewsItem],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = out_dir.join(format!("{date}_ALL.md"));
    fs::write(&path, to_markdown(items)).await?;
    info!(path = %path.display(), "Wrote Markdown issue");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str, url: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: summary.to_string(),
            url: url.to_string(),
            source: "test".to_string(),
            published_at: "2024-01-01T10:00:00+01:00".to_string(),
            topic: "Ogólne".to_string(),
        }
    }

    #[test]
    fn test_to_markdown_one_line_per_item() {
        let md = to_markdown(&[
            item(" OpenAI ", "Nowy model ", "https://example.pl/a"),
            item("Meta", "", "https://example.pl/b"),
        ]);
        assert_eq!(
            md,
            "- **OpenAI** — Nowy model [Czytaj](https://example.pl/a)\n- **Meta** —  [Czytaj](https://example.pl/b)"
        );
    }

    #[test]
    fn test_to_markdown_empty() {
        assert_eq!(to_markdown(&[]), "");
    }

    #[tokio::test]
    async fn test_write_markdown_uses_dated_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_markdown(dir.path(), "2024-01-01", &[item("T", "S", "https://x/")])
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("2024-01-01_ALL.md"));
        assert!(tokio::fs::read_to_string(&path).await.unwrap().starts_with("- **T**"));
    }
}
