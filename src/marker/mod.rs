//! Per-topic "last notified" markers and the novelty check built on them.

mod repository;

pub use repository::MarkerRepository;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::Article;

/// The last article a topic was notified about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMarker {
    /// Topic key.
    pub topic: String,
    /// Link of the last notified article.
    pub link: String,
    /// Title of the last notified article.
    pub title: String,
    /// When the marker was written.
    pub notified_at: DateTime<Utc>,
}

/// Whether `candidate` has not been notified yet for the marker's topic.
///
/// Identity is the exact link; there is no time window or similarity check.
pub fn is_novel(marker: Option<&NotificationMarker>, candidate: &Article) -> bool {
    marker.map_or(true, |m| m.link != candidate.link)
}
