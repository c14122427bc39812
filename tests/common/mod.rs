//! Test helpers for integration tests.
//!
//! Provides stub feed fetchers, stub push senders and RSS document builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fastnews::push::{Delivery, PushData};
use fastnews::{
    Database, Dispatcher, FastNewsError, FeedFetcher, NewsPipeline, PushMessage, PushSender,
    Result,
};

/// Fetcher serving fixed documents by URL. Unknown URLs fail.
#[derive(Default)]
pub struct StubFetcher {
    feeds: HashMap<String, String>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, body: impl Into<String>) -> Self {
        self.feeds.insert(url.to_string(), body.into());
        self
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.feeds
            .get(url)
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| FastNewsError::Feed(format!("HTTP error: 503 for {url}")))
    }
}

/// Sender that records every message and optionally fails.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<PushMessage>>,
    failing: Mutex<bool>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sender = Self::default();
        sender.set_failing(true);
        sender
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Links of the articles sent so far, in order.
    pub fn sent_links(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m.data {
                PushData::Article { article, .. } => Some(article.link),
                PushData::Test { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    async fn send(&self, message: &PushMessage) -> Result<Delivery> {
        if *self.failing.lock().unwrap() {
            return Err(FastNewsError::Push(
                "FCM rejected message: 503 Service Unavailable".to_string(),
            ));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(Delivery::Sent(format!(
            "projects/fastnews/messages/{}",
            sent.len()
        )))
    }
}

/// One RSS item: (title, link, pubDate).
pub type Item<'a> = (&'a str, &'a str, &'a str);

/// Build an RSS 2.0 document.
pub fn rss(items: &[Item<'_>]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, date)| {
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>Tóm tắt</description><pubDate>{date}</pubDate></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Tin tức</title><link>https://vnexpress.net</link>
<description>Feed</description>{body}</channel></rss>"#
    )
}

/// Build a pipeline over an in-memory database.
pub async fn create_pipeline(
    fetcher: StubFetcher,
    sender: Arc<RecordingSender>,
) -> (NewsPipeline, Arc<Database>) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );
    let dispatcher = Dispatcher::new(db.clone(), sender);
    let pipeline = NewsPipeline::new(db.clone(), Arc::new(fetcher), dispatcher, 5);
    (pipeline, db)
}
