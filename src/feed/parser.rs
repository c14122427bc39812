//! Feed document parsing.

use feed_rs::parser;
use tracing::debug;

use crate::error::{FastNewsError, Result};
use crate::feed::types::ParsedItem;

/// Parse a feed document into at most `max_items` items, in document order.
///
/// Items without a link are dropped since the link is the article identity.
/// A missing title becomes an empty string, a missing description an empty
/// string and a missing or unparseable date `None`.
pub fn parse_feed(bytes: &[u8], max_items: usize) -> Result<Vec<ParsedItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| FastNewsError::Parse(format!("failed to parse feed: {}", e)))?;

    let items = feed
        .entries
        .into_iter()
        .take(max_items)
        .filter_map(|entry| {
            let Some(link) = entry.links.first().map(|l| l.href.trim().to_string()) else {
                debug!("Skipping feed entry without link: {}", entry.id);
                return None;
            };
            if link.is_empty() {
                return None;
            }

            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            Some(ParsedItem {
                title,
                link,
                description,
                published_at: entry.published.or(entry.updated),
            })
        })
        .collect();

    Ok(items)
}
