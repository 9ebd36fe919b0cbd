//! Live RSS fetching.
//!
//! Feeds are polled one after another. A feed that fails to download or parse
//! is logged and skipped; the run continues with whatever the other feeds gave.
//!
//! # Default feeds
//!
//! Without a `sources.feeds` override the digest polls Google News searches in
//! Polish (see [`DEFAULT_QUERIES`]). Google News item links point back at
//! `news.google.com`; the canonicalizer unwraps them when the target is
//! carried in the link.

use crate::canonical::canonicalize_url;
use crate::models::{DEFAULT_TOPIC, NewsItem};
use crate::utils::{clean_text, truncate_for_log};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

/// Maximum number of entries taken from a single feed.
pub const MAX_ENTRIES_PER_FEED: usize = 50;

const FALLBACK_SOURCE: &str = "Google News";

/// Search phrases behind the built-in Google News feeds.
pub const DEFAULT_QUERIES: &[&str] = &[
    "sztuczna inteligencja",
    "AI technologia",
    "uczenie maszynowe",
    "genAI OR \"generatywna sztuczna inteligencja\"",
    "OpenAI OR Anthropic OR Google AI OR Meta AI OR Hugging Face",
];

/// Google News RSS search URL for a Polish-language query.
pub fn google_news_feed(query: &str) -> String {
    format!(
        "https://news.google.com/rss/search?q={}&hl=pl&gl=PL&ceid=PL:pl",
        urlencoding::encode(query)
    )
}

/// The built-in feed list.
pub fn default_feeds() -> Vec<String> {
    DEFAULT_QUERIES.iter().map(|q| google_news_feed(q)).collect()
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an RSS 2.0 document into items published within `window_hours` of `now`.
///
/// Entries without a link (or permalink `guid`) are skipped; entries without a
/// parseable `pubDate` are stamped with `now`. Only the first
/// [`MAX_ENTRIES_PER_FEED`] entries are considered.
pub fn parse_feed(
    xml: &str,
    now: &DateTime<Tz>,
    window_hours: i64,
) -> Result<Vec<NewsItem>, Box<dyn Error>> {
    let rss: Rss = from_str(xml)?;
    let cutoff = Duration::try_hours(window_hours).and_then(|window| now.checked_sub_signed(window));
    if cutoff.is_none() {
        warn!(window_hours, "Window out of range; keeping entries of any age");
    }
    let source = non_empty(rss.channel.title.as_deref())
        .unwrap_or(FALLBACK_SOURCE)
        .to_string();

    let mut out = Vec::new();
    for entry in rss.channel.items.into_iter().take(MAX_ENTRIES_PER_FEED) {
        let link = non_empty(entry.link.as_deref())
            .or_else(|| non_empty(entry.guid.as_ref().map(|g| g.value.as_str())))
            .unwrap_or_default();
        if link.is_empty() {
            debug!(title = ?entry.title, "Skipping entry without a link");
            continue;
        }

        let published = entry
            .pub_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
            .map(|d| d.with_timezone(&now.timezone()))
            .unwrap_or(*now);
        if cutoff.is_some_and(|cutoff| published < cutoff) {
            continue;
        }

        out.push(NewsItem {
            title: clean_text(entry.title.as_deref().unwrap_or_default()),
            summary: clean_text(entry.description.as_deref().unwrap_or_default()),
            url: canonicalize_url(link),
            source: source.clone(),
            published_at: published.to_rfc3339(),
            topic: DEFAULT_TOPIC.to_string(),
        });
    }
    Ok(out)
}

/// Download and parse a single feed.
#[instrument(level = "info", skip(client, now))]
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    now: &DateTime<Tz>,
    window_hours: i64,
) -> Result<Vec<NewsItem>, Box<dyn Error>> {
    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    debug!(bytes = body.len(), "Downloaded feed");
    parse_feed(&body, now, window_hours).inspect_err(|e| {
        warn!(error = %e, body_preview = %truncate_for_log(&body, 300), "Feed is not valid RSS");
    })
}

/// Poll every feed in turn; failures are logged and skipped.
#[instrument(level = "info", skip_all, fields(feeds = feeds.len(), window_hours = window_hours))]
pub async fn fetch_all(feeds: &[String], now: &DateTime<Tz>, window_hours: i64) -> Vec<NewsItem> {
    let client = match reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client; skipping live feeds");
            return Vec::new();
        }
    };

    let mut items = Vec::new();
    for feed in feeds {
        match fetch_feed(&client, feed, now, window_hours).await {
            Ok(mut fetched) => {
                info!(feed = %feed, count = fetched.len(), "Fetched feed");
                items.append(&mut fetched);
            }
            Err(e) => warn!(feed = %feed, error = %e, "RSS fetch failed; skipping feed"),
        }
    }
    info!(count = items.len(), "Fetched live items");
    items
}
