//! Utility functions for the Warsaw clock, file handling and text cleanup.
//!
//! - Calendar date of the issue in Europe/Warsaw
//! - Tolerant JSON and line-file readers (missing or broken files read as empty)
//! - Atomic JSON writes (temp file + rename)
//! - Output directory creation
//! - Text cleanup for feed summaries and log truncation

use chrono::{DateTime, Utc};
use chrono_tz::{Europe::Warsaw, Tz};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Current wall-clock time in Europe/Warsaw.
pub fn now_pl() -> DateTime<Tz> {
    Utc::now().with_timezone(&Warsaw)
}

/// The issue date (`YYYY-MM-DD`) for a Warsaw-local instant.
pub fn issue_date(now: &DateTime<Tz>) -> String {
    now.date_naive().to_string()
}

/// Epoch seconds with sub-second precision, the unit of the seen-cache.
pub fn epoch_seconds(now: &DateTime<Tz>) -> f64 {
    now.timestamp_millis() as f64 / 1000.0
}

/// Resolve a configured path against the working root; absolute paths are kept.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Read a JSON file, returning `default` when the file is missing or unreadable.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn read_json_or<T: DeserializeOwned>(path: &Path, default: T) -> T {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("File does not exist; using default");
            return default;
        }
        Err(e) => {
            warn!(error = %e, "Failed reading file; using default");
            return default;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Malformed JSON; using default");
            default
        }
    }
}

/// Write `value` as pretty JSON to `path` without ever leaving a partial file.
///
/// The data goes to `<path>.tmp` first and is then renamed over `path`.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read non-empty, trimmed lines of a text file. A missing file reads as empty.
pub async fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path).await {
        Ok(text) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed reading text file");
            }
            Vec::new()
        }
    }
}

/// Create every output directory under `root`: `out/`, `site/`, `site/assets/`, `data/`.
#[instrument(level = "info", skip_all, fields(root = %root.display()))]
pub async fn ensure_dirs(root: &Path) -> Result<(), Box<dyn Error>> {
    for dir in ["out", "site", "site/assets", "data"] {
        fs::create_dir_all(root.join(dir)).await?;
    }
    info!("Output directories ready");
    Ok(())
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Turn an HTML fragment (as found in RSS descriptions) into a single line of text.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("<b>OpenAI</b>\n  &amp; Meta"), "OpenAI & Meta");
/// ```
pub fn clean_text(fragment: &str) -> String {
    let text = if fragment.contains('<') || fragment.contains('&') {
        Html::parse_fragment(fragment)
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        fragment.to_string()
    };
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backing off to a char boundary) with an
/// ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
