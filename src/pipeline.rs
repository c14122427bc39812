//! Topic runs and sweeps.
//!
//! A topic run fetches every source of the topic, picks the newest article
//! and dispatches it if the topic's marker does not already point at it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::aggregator::{aggregate, newest};
use crate::config::TopicConfig;
use crate::db::Database;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::feed::{fetch_sources, FeedFetcher};
use crate::marker::{is_novel, MarkerRepository, NotificationMarker};
use crate::Result;

/// Result of one topic run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    /// No source produced any article.
    NoArticles,
    /// The newest article was already notified.
    AlreadyNotified,
    /// A notification was sent and the marker advanced.
    Notified(NotificationMarker),
    /// A new article was found but push delivery is disabled.
    DryRun,
}

/// Per-topic results of a sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Topics that were notified.
    pub notified: Vec<String>,
    /// Topics with nothing new.
    pub unchanged: Vec<String>,
    /// Topics with a new article that was only logged.
    pub dry_run: Vec<String>,
    /// Topics whose run failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl SweepReport {
    /// Number of topics processed.
    pub fn total(&self) -> usize {
        self.notified.len() + self.unchanged.len() + self.dry_run.len() + self.failed.len()
    }
}

/// Fetch, select and dispatch pipeline shared by the scheduled jobs.
pub struct NewsPipeline {
    db: Arc<Database>,
    fetcher: Arc<dyn FeedFetcher>,
    dispatcher: Dispatcher,
    max_items: usize,
    topic_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl NewsPipeline {
    /// Create a new pipeline.
    pub fn new(
        db: Arc<Database>,
        fetcher: Arc<dyn FeedFetcher>,
        dispatcher: Dispatcher,
        max_items: usize,
    ) -> Self {
        Self {
            db,
            fetcher,
            dispatcher,
            max_items,
            topic_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The dispatcher used by this pipeline.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn topic_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .topic_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Run one topic.
    ///
    /// Runs for the same topic are serialized so the marker is never read
    /// and written by two runs at once.
    pub async fn run_topic(&self, topic: &TopicConfig) -> Result<TopicOutcome> {
        let lock = self.topic_lock(&topic.key);
        let _guard = lock.lock().await;

        let batches = fetch_sources(self.fetcher.as_ref(), &topic.sources, self.max_items).await;
        let articles = aggregate(batches);
        let Some(candidate) = newest(&articles) else {
            debug!("Topic {}: no articles", topic.key);
            return Ok(TopicOutcome::NoArticles);
        };

        let marker = MarkerRepository::new(self.db.pool())
            .get(&topic.key)
            .await?;
        if !is_novel(marker.as_ref(), candidate) {
            debug!("Topic {}: {} already notified", topic.key, candidate.link);
            return Ok(TopicOutcome::AlreadyNotified);
        }

        match self.dispatcher.dispatch(topic, candidate).await? {
            DispatchOutcome::Delivered(marker) => Ok(TopicOutcome::Notified(marker)),
            DispatchOutcome::DryRun => Ok(TopicOutcome::DryRun),
        }
    }

    /// Run every topic in order. A failing topic does not stop the sweep.
    pub async fn sweep(&self, topics: &[TopicConfig]) -> SweepReport {
        let mut report = SweepReport::default();

        for topic in topics {
            match self.run_topic(topic).await {
                Ok(TopicOutcome::Notified(marker)) => {
                    info!("Topic {}: notified \"{}\"", topic.key, marker.title);
                    report.notified.push(topic.key.clone());
                }
                Ok(TopicOutcome::DryRun) => report.dry_run.push(topic.key.clone()),
                Ok(_) => report.unchanged.push(topic.key.clone()),
                Err(e) => {
                    error!("Topic {} failed: {}", topic.key, e);
                    report.failed.push((topic.key.clone(), e.to_string()));
                }
            }
        }

        report
    }
}
