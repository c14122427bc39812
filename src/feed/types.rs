//! Feed and article types for FastNews.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the link hash.
pub const ARTICLE_ID_LENGTH: usize = 16;

/// An item as read from a single feed document, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    /// Item title.
    pub title: String,
    /// Canonical article URL.
    pub link: String,
    /// Raw description, possibly HTML. Empty when the feed omits it.
    pub description: String,
    /// Publish time from the feed, if present and parseable.
    pub published_at: Option<DateTime<Utc>>,
}

/// Items read from one source URL.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// The feed URL the items came from.
    pub url: String,
    /// Items in document order.
    pub items: Vec<ParsedItem>,
}

impl SourceBatch {
    /// Create a new batch.
    pub fn new(url: impl Into<String>, items: Vec<ParsedItem>) -> Self {
        Self {
            url: url.into(),
            items,
        }
    }
}

/// An aggregated article, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Stable identifier derived from `link`.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Canonical URL, the identity key.
    pub link: String,
    /// Raw description excerpt.
    pub description: String,
    /// Publish time; `None` sorts as the oldest.
    pub published_at: Option<DateTime<Utc>>,
    /// Label of the upstream feed provider.
    pub source: String,
}

impl Article {
    /// Build an article from a parsed item and its source label.
    pub fn from_item(item: ParsedItem, source: impl Into<String>) -> Self {
        Self {
            id: article_id(&item.link),
            title: item.title,
            link: item.link,
            description: item.description,
            published_at: item.published_at,
            source: source.into(),
        }
    }

    /// Publish time used for ordering, with missing values at the epoch.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or_default()
    }
}

/// Derive the article ID from its link.
///
/// The ID is the first 16 lowercase hex characters of SHA-256(link), so a
/// client can recompute it from the link alone.
pub fn article_id(link: &str) -> String {
    let digest = Sha256::digest(link.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(ARTICLE_ID_LENGTH);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_article_id_is_deterministic() {
        let a = article_id("https://vnexpress.net/bai-viet-1.html");
        let b = article_id("https://vnexpress.net/bai-viet-1.html");
        assert_eq!(a, b);
        assert_eq!(a.len(), ARTICLE_ID_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_article_id_known_value() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223...
        assert_eq!(article_id("abc"), "ba7816bf8f01cfea");
    }

    #[test]
    fn test_article_id_differs_per_link() {
        let ids: std::collections::HashSet<String> = (0..500)
            .map(|i| article_id(&format!("https://example.com/article/{i}")))
            .collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_from_item_sets_id_and_source() {
        let item = ParsedItem {
            title: "Tiêu đề".to_string(),
            link: "https://tuoitre.vn/a.htm".to_string(),
            description: String::new(),
            published_at: None,
        };
        let article = Article::from_item(item, "Tuổi Trẻ");

        assert_eq!(article.id, article_id("https://tuoitre.vn/a.htm"));
        assert_eq!(article.source, "Tuổi Trẻ");
        assert_eq!(article.title, "Tiêu đề");
    }

    #[test]
    fn test_sort_key_defaults_to_epoch() {
        let mut article = Article::from_item(
            ParsedItem {
                title: "t".to_string(),
                link: "https://example.com/1".to_string(),
                description: String::new(),
                published_at: None,
            },
            "x",
        );
        assert_eq!(article.sort_key().timestamp(), 0);

        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        article.published_at = Some(ts);
        assert_eq!(article.sort_key(), ts);
    }
}
