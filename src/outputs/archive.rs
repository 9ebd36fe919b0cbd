//! The archive page: one link per published issue, newest first.
//!
//! `site/archive.html` is created from a template on first use. Each new date
//! is inserted directly below the `<ul class="archive">` opening tag, so the
//! list reads newest first. A date that is already listed is left alone, which
//! keeps repeated runs for the same day from changing the file.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

const LIST_OPEN: &str = "<ul class=\"archive\">\n";

fn archive_template(title: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="pl">
<head>
<meta charset="utf-8" />
<title>Archiwum — {}</title>
<link rel="stylesheet" href="assets/custom.css" />
</head>
<body>
<header><h1>Archiwum</h1></header>
<main>
<ul class="archive">
</ul>
</main>
</body>
</html>
"#,
        html_escape::encode_text(title)
    )
}

fn archive_entry(date: &str) -> String {
    format!("<li><a href=\"{date}.html\">{date}</a></li>")
}

/// Insert `date` at the top of the archive list in `html`.
///
/// Returns `None` when the date is already listed or the page has no archive list.
pub fn insert_entry(html: &str, date: &str) -> Option<String> {
    let entry = archive_entry(date);
    if html.contains(&entry) {
        return None;
    }
    if !html.contains(LIST_OPEN) {
        warn!(%date, "Archive page has no <ul class=\"archive\"> list; entry not added");
        return None;
    }
    let mut updated = html.replacen(LIST_OPEN, &format!("{LIST_OPEN}{entry}\n"), 1);
    if !updated.ends_with('\n') {
        updated.push('\n');
    }
    Some(updated)
}

/// Add `date` to `site/archive.html`, creating the page if needed.
///
/// Returns `true` when the file changed.
#[instrument(level = "info", skip_all, fields(site_dir = %site_dir.display(), date = %date))]
pub async fn update_archive(site_dir: &Path, date: &str, title: &str) -> Result<bool, Box<dyn Error>> {
    let path = site_dir.join("archive.html");
    let html = if fs::try_exists(&path).await? {
        fs::read_to_string(&path).await?
    } else {
        archive_template(title)
    };

    match insert_entry(&html, date) {
        Some(updated) => {
            fs::write(&path, updated).await?;
            info!(path = %path.display(), "Updated archive");
            Ok(true)
        }
        None => {
            debug!("Archive left unchanged");
            Ok(false)
        }
    }
}
