//! FastNews - news feed notifier
//!
//! Polls Vietnamese news RSS feeds on a schedule and pushes the newest
//! article of every topic to its subscribers, once per article.

pub mod aggregator;
pub mod config;
pub mod datetime;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod feed;
pub mod logging;
pub mod marker;
pub mod pipeline;
pub mod push;
pub mod scheduler;
pub mod web;

pub use config::{Config, JobKind, TopicConfig};
pub use db::Database;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{FastNewsError, Result};
pub use feed::{Article, FeedFetcher, HttpFeedFetcher};
pub use marker::{MarkerRepository, NotificationMarker};
pub use pipeline::{NewsPipeline, SweepReport, TopicOutcome};
pub use push::{Delivery, PushMessage, PushSender};
pub use scheduler::Scheduler;
pub use web::WebServer;
