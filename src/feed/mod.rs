//! Feed ingestion for FastNews.
//!
//! This module fetches RSS documents, parses them into items and labels
//! each item with the publisher it came from.

pub mod fetcher;
pub mod parser;
pub mod source;
pub mod types;

pub use fetcher::{fetch_sources, validate_url, FeedFetcher, HttpFeedFetcher};
pub use parser::parse_feed;
pub use source::{source_label, DEFAULT_SOURCE_LABEL};
pub use types::{article_id, Article, ParsedItem, SourceBatch, ARTICLE_ID_LENGTH};
