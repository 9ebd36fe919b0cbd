//! Static HTML page for an issue.
//!
//! The page is written twice: as `site/<date>.html` (the permanent issue and
//! the daily guard marker) and as `site/index.html` (always the latest issue).

use crate::models::{FooterLink, NewsItem};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Stylesheet installed at `site/assets/custom.css` when none exists yet.
const DEFAULT_STYLESHEET: &str = "\
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 0 auto; padding: 1rem; line-height: 1.5; }
header h1 { margin-bottom: 0; }
header .date { color: #666; }
ul.news li { margin: 0.5rem 0; }
.src { color: #888; font-size: 0.9em; }
footer { margin-top: 2rem; border-top: 1px solid #ddd; padding-top: 0.5rem; }
";

/// Everything the page template needs.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub date: &'a str,
    pub title: &'a str,
    pub banner: &'a str,
    pub items: &'a [NewsItem],
    pub footer_links: &'a [FooterLink],
}

pub fn to_html_page(page: &PageContext<'_>) -> String {
    let items: String = page
        .items
        .iter()
        .map(|item| {
            format!(
                "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>\n        <span class=\"src\">({})</span></li>",
                attr(&item.url),
                text(&item.title),
                text(&item.source)
            )
        })
        .collect();

    let mut nav: Vec<String> = page
        .footer_links
        .iter()
        .map(|link| format!("<a href=\"{}\">{}</a>", attr(link.url()), text(link.label())))
        .collect();
    nav.push("<a href=\"archive.html\">Archiwum</a>".to_string());

    format!(
        r#"<!doctype html>
<html lang="pl">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title} — {date}</title>
<link rel="stylesheet" href="assets/custom.css" />
</head>
<body>
<header><h1>{banner}</h1><div class="date">{date}</div></header>
<main>
  <ul class="news">
    {items}
  </ul>
</main>
<footer>
  <nav>{nav}</nav>
</footer>
</body>
</html>"#,
        title = text(page.title),
        date = text(page.date),
        banner = text(page.banner),
        items = items,
        nav = nav.join(" | "),
    )
}

/// Path of the page for `date` inside `site_dir`.
pub fn issue_path(site_dir: &Path, date: &str) -> PathBuf {
    site_dir.join(format!("{date}.html"))
}

/// Write `site/<date>.html` and overwrite `site/index.html` with the same page.
#[instrument(level = "info", skip_all, fields(date = %date))]
pub async fn write_pages(site_dir: &Path, date: &str, html: &str) -> Result<PathBuf, Box<dyn Error>> {
    let issue = issue_path(site_dir, date);
    fs::write(&issue, html).await?;
    fs::write(site_dir.join("index.html"), html).await?;
    info!(path = %issue.display(), "Wrote issue page and index.html");
    Ok(issue)
}

/// Install the default stylesheet unless the site already has one.
pub async fn ensure_stylesheet(site_dir: &Path) -> Result<(), Box<dyn Error>> {
    let path = site_dir.join("assets").join("custom.css");
    if fs::try_exists(&path).await? {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&path, DEFAULT_STYLESHEET).await?;
    debug!(path = %path.display(), "Installed default stylesheet");
    Ok(())
}
