//! Feed fetching over HTTP.
//!
//! Fetch and parse failures are isolated per source: a broken feed only
//! removes its own items from the topic's run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::FeedsConfig;
use crate::error::{FastNewsError, Result};
use crate::feed::parser::parse_feed;
use crate::feed::types::SourceBatch;

/// Retrieves raw feed documents.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the raw body of the feed at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP feed fetcher with timeouts and a body size limit.
pub struct HttpFeedFetcher {
    client: Client,
    max_feed_size: u64,
}

impl HttpFeedFetcher {
    /// Create a fetcher from the feed configuration.
    pub fn new(config: &FeedsConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FastNewsError::Feed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
        })
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_feed_size {
            return Err(FastNewsError::Feed(format!(
                "feed too large: {} bytes (max {} bytes)",
                size, self.max_feed_size
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FastNewsError::Feed(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FastNewsError::Feed(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length)?;
        }

        // Chunked bodies carry no length, so the limit is enforced while reading
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FastNewsError::Feed(format!("failed to read response: {}", e)))?
        {
            self.check_size((body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

/// Fetch and parse every source of a topic, one after another.
///
/// A source that fails to fetch or parse is logged and contributes nothing.
pub async fn fetch_sources(
    fetcher: &dyn FeedFetcher,
    sources: &[String],
    max_items: usize,
) -> Vec<SourceBatch> {
    let mut batches = Vec::with_capacity(sources.len());

    for url in sources {
        let body = match fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping source {}: {}", url, e);
                continue;
            }
        };

        match parse_feed(&body, max_items) {
            Ok(items) => {
                debug!("Source {} returned {} item(s)", url, items.len());
                batches.push(SourceBatch::new(url.as_str(), items));
            }
            Err(e) => warn!("Skipping source {}: {}", url, e),
        }
    }

    batches
}

/// Validate a configured feed URL.
///
/// Only absolute http/https URLs with a host are accepted.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| FastNewsError::Config(format!("invalid feed URL {}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FastNewsError::Config(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(FastNewsError::Config(format!("URL has no host: {}", url)));
    }

    Ok(())
}
