//! Relevance filtering and URL-based deduplication.

use crate::models::NewsItem;
use itertools::Itertools;

/// Phrases that mark promotional or low-value items.
const NOISE: &[&str] = &["sponsorowany", "kupon", "rabaty", "benchmark", "plotka", "zniżka"];

/// Terms that make an item worth keeping even when it contains noise.
const KEY_TERMS: &[&str] = &[
    "AI",
    "sztuczna inteligencja",
    "model językowy",
    "LLM",
    "uczenie maszynowe",
    "genAI",
    "dyfuzja",
    "multimodalny",
    "wideo AI",
    "rozpoznawanie",
    "NLP",
    "robotyka",
    "stabilność",
    "OpenAI",
    "Google",
    "Anthropic",
    "Meta",
    "Stability",
    "Hugging Face",
];

/// An item is rejected only when it mentions a noise phrase and none of the key terms.
///
/// Matching is case-insensitive substring search over `"<title> <summary>"`,
/// so short terms like `AI` also match inside longer words.
pub fn is_relevant(item: &NewsItem) -> bool {
    let text = format!("{} {}", item.title, item.summary).to_lowercase();
    let noisy = NOISE.iter().any(|n| text.contains(n));
    if noisy {
        return KEY_TERMS.iter().any(|k| text.contains(&k.to_lowercase()));
    }
    true
}

/// The dedup identity of a URL: everything before `?`, without trailing slashes.
pub fn dedup_key(url: &str) -> &str {
    url.split('?').next().unwrap_or(url).trim_end_matches('/')
}

/// Drop later items whose [`dedup_key`] was already seen. Survivors keep their input order.
pub fn dedup(items: Vec<NewsItem>) -> Vec<NewsItem> {
    items
        .into_iter()
        .unique_by(|item| dedup_key(&item.url).to_string())
        .collect()
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
    fn test_plain_item_is_relevant() {
        assert!(is_relevant(&item("Nowy procesor", "Premiera", "https://x/1")));
    }

    #[test]
    fn test_noise_without_key_term_is_rejected() {
        assert!(!is_relevant(&item("Kupon na zniżkę", "Sprawdź rabaty w sklepie", "https://x/1")));
        assert!(!is_relevant(&item("Artykuł SPONSOROWANY", "", "https://x/2")));
    }

    #[test]
    fn test_key_term_overrides_noise() {
        assert!(is_relevant(&item("Benchmark nowego modelu", "OpenAI publikuje wyniki", "https://x/1")));
        assert!(is_relevant(&item("Plotka", "o uczenie maszynowe", "https://x/2")));
    }

    #[test]
    fn test_short_key_term_matches_inside_words() {
        // "ai" is found inside "mail", which keeps the item.
        assert!(is_relevant(&item("Kupon do mail-shopu", "", "https://x/1")));
    }

    #[test]
    fn test_dedup_key() {
        assert_eq!(dedup_key("https://example.com/a/?utm=1"), "https://example.com/a");
        assert_eq!(dedup_key("https://example.com/a//"), "https://example.com/a");
        assert_eq!(dedup_key("https://example.com/a#frag"), "https://example.com/a#frag");
    }

    #[test]
    fn test_dedup_keeps_first_and_preserves_order() {
        let items = vec![
            item("pierwszy", "", "https://example.com/a?x=1"),
            item("inny", "", "https://example.com/b"),
            item("drugi", "", "https://example.com/a/?x=2"),
            item("trzeci", "", "https://example.com/c"),
            item("duplikat", "", "https://example.com/b/"),
        ];
        let titles: Vec<String> = dedup(items).into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["pierwszy", "inny", "trzeci"]);
    }
}
