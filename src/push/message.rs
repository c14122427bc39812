//! Push message types.
//!
//! Every notification kind has an explicit payload type. The string map the
//! push channel needs is produced (and checked) only at the send boundary.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::{FastNewsError, Result};
use crate::feed::Article;

/// Click action understood by the Flutter client.
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Upper bound on the data map (keys plus values) accepted by FCM.
pub const MAX_DATA_PAYLOAD_BYTES: usize = 4096;

/// Longest description carried in an article payload, in bytes.
pub const MAX_DESCRIPTION_BYTES: usize = 1024;

/// First `<img ... src="...">` (single or double quotes) in an HTML fragment.
static IMG_SRC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Extract the first image URL from an article description.
///
/// Returns an empty string when the description has no image tag.
pub fn extract_image_url(description: &str) -> String {
    IMG_SRC_PATTERN
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Cut `text` to at most `max_bytes`, on a character boundary.
fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Human-readable part of a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

/// The full article as carried inside an article notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticlePayload {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub image_url: String,
    pub source: String,
    /// RFC3339, empty when the feed had no date.
    pub published_at: String,
}

impl ArticlePayload {
    /// Build the payload for an article.
    ///
    /// The image is taken from the full description before it is cut to
    /// [`MAX_DESCRIPTION_BYTES`].
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            link: article.link.clone(),
            description: truncate_to_bytes(&article.description, MAX_DESCRIPTION_BYTES)
                .to_string(),
            image_url: extract_image_url(&article.description),
            source: article.source.clone(),
            published_at: article
                .published_at
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Machine-readable part of a push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushData {
    /// A new article for a topic.
    Article {
        /// Topic key the article was found under.
        topic: String,
        /// The article itself.
        article: ArticlePayload,
    },
    /// An operator-triggered test message.
    Test {
        /// When the test was triggered.
        sent_at: DateTime<Utc>,
    },
}

/// Keys the push channel reserves for itself.
fn is_reserved_key(key: &str) -> bool {
    matches!(key, "from" | "notification" | "message_type")
        || key.starts_with("google")
        || key.starts_with("gcm")
}

impl PushData {
    /// Flatten into the string map sent over the wire.
    ///
    /// The article travels as one serialized JSON blob under `article`.
    /// Fails with a validation error when the map would exceed
    /// [`MAX_DATA_PAYLOAD_BYTES`].
    pub fn to_data_map(&self) -> Result<BTreeMap<String, String>> {
        let mut data = BTreeMap::new();
        match self {
            PushData::Article { topic, article } => {
                data.insert("kind".to_string(), "article".to_string());
                data.insert("topic".to_string(), topic.clone());
                data.insert("click_action".to_string(), CLICK_ACTION.to_string());
                data.insert("article".to_string(), serde_json::to_string(article).map_err(
                    |e| FastNewsError::Validation(format!("failed to serialize article: {e}")),
                )?);
            }
            PushData::Test { sent_at } => {
                data.insert("kind".to_string(), "test".to_string());
                data.insert("test".to_string(), "true".to_string());
                data.insert("timestamp".to_string(), sent_at.to_rfc3339());
            }
        }

        if let Some(key) = data.keys().find(|k| is_reserved_key(k)) {
            return Err(FastNewsError::Validation(format!(
                "reserved data key: {key}"
            )));
        }

        let size: usize = data.iter().map(|(k, v)| k.len() + v.len()).sum();
        if size > MAX_DATA_PAYLOAD_BYTES {
            return Err(FastNewsError::Validation(format!(
                "data payload is {size} bytes, limit is {MAX_DATA_PAYLOAD_BYTES}"
            )));
        }
        Ok(data)
    }

    /// Image to attach to the notification, if any.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            PushData::Article { article, .. } if !article.image_url.is_empty() => {
                Some(article.image_url.as_str())
            }
            _ => None,
        }
    }
}

/// A message broadcast to every subscriber of a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// Topic (push channel) name.
    pub topic: String,
    /// Human-readable part.
    pub notification: Notification,
    /// Machine-readable part.
    pub data: PushData,
}

impl PushMessage {
    /// Notification announcing a new article on a topic.
    pub fn article(topic: &str, display_name: &str, article: &Article) -> Self {
        Self {
            topic: topic.to_string(),
            notification: Notification {
                title: format!("📰 {}", display_name),
                body: article.title.clone(),
            },
            data: PushData::Article {
                topic: topic.to_string(),
                article: ArticlePayload::from_article(article),
            },
        }
    }

    /// Fixed test notification.
    pub fn test(topic: &str, sent_at: DateTime<Utc>) -> Self {
        Self {
            topic: topic.to_string(),
            notification: Notification {
                title: "🧪 Test Notification".to_string(),
                body: "FastNews notifier hoạt động tốt! 🎉".to_string(),
            },
            data: PushData::Test { sent_at },
        }
    }
}
