//! Notification dispatch.
//!
//! A marker is only written after the push channel has accepted the message.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::config::{TopicConfig, ALL_USERS_TOPIC};
use crate::db::Database;
use crate::feed::Article;
use crate::marker::{MarkerRepository, NotificationMarker};
use crate::push::{Delivery, PushMessage, PushSender};
use crate::Result;

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The push channel accepted the message and the marker advanced.
    Delivered(NotificationMarker),
    /// Push delivery is disabled. The message was logged and the marker left alone.
    DryRun,
}

/// Sends notifications and records what was sent.
#[derive(Clone)]
pub struct Dispatcher {
    db: Arc<Database>,
    sender: Arc<dyn PushSender>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(db: Arc<Database>, sender: Arc<dyn PushSender>) -> Self {
        Self { db, sender }
    }

    /// Notify the topic's subscribers about `article` and advance its marker.
    pub async fn dispatch(&self, topic: &TopicConfig, article: &Article) -> Result<DispatchOutcome> {
        let message = PushMessage::article(&topic.key, &topic.display_name, article);

        let message_id = match self.sender.send(&message).await {
            Ok(Delivery::Sent(id)) => id,
            Ok(Delivery::Logged) => {
                info!(
                    "Dry run for topic {}: {} not marked as notified",
                    topic.key, article.link
                );
                return Ok(DispatchOutcome::DryRun);
            }
            Err(e) => {
                error!("Push to topic {} failed: {}", topic.key, e);
                return Err(e);
            }
        };
        info!(
            "Notified topic {} about {} ({})",
            topic.key, article.link, message_id
        );

        let marker = MarkerRepository::new(self.db.pool())
            .upsert(&topic.key, &article.link, &article.title, Utc::now())
            .await?;
        Ok(DispatchOutcome::Delivered(marker))
    }

    /// Send the fixed test notification to the all-users topic.
    pub async fn send_test_notification(&self) -> Result<Delivery> {
        let message = PushMessage::test(ALL_USERS_TOPIC, Utc::now());
        let delivery = self.sender.send(&message).await?;
        info!("Test notification handled: {:?}", delivery);
        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, JobKind};
    use crate::error::FastNewsError;
    use crate::feed::ParsedItem;
    use crate::push::{sender_from_config, PushData};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<PushMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl PushSender for RecordingSender {
        async fn send(&self, message: &PushMessage) -> Result<Delivery> {
            if self.fail {
                return Err(FastNewsError::Push("unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(Delivery::Sent("projects/test/messages/1".to_string()))
        }
    }

    fn topic() -> TopicConfig {
        TopicConfig::new("the_thao", "Thể thao", &["https://a/rss"], JobKind::Categories)
    }

    fn article() -> Article {
        Article::from_item(
            ParsedItem {
                title: "X".to_string(),
                link: "https://a/1".to_string(),
                description: String::new(),
                published_at: None,
            },
            "VNExpress",
        )
    }

    #[tokio::test]
    async fn test_dispatch_writes_marker_after_send() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(db.clone(), sender.clone());

        let outcome = dispatcher.dispatch(&topic(), &article()).await.unwrap();
        let DispatchOutcome::Delivered(marker) = outcome else {
            panic!("expected delivery, got {outcome:?}");
        };
        assert_eq!(marker.link, "https://a/1");
        assert_eq!(marker.title, "X");

        {
            let sent = sender.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].topic, "the_thao");
            assert_eq!(sent[0].notification.title, "📰 Thể thao");
        }

        let stored = MarkerRepository::new(db.pool())
            .get("the_thao")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.link, "https://a/1");
    }

    #[tokio::test]
    async fn test_dispatch_failure_leaves_marker() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(db.clone(), sender);

        let err = dispatcher.dispatch(&topic(), &article()).await.unwrap_err();
        assert!(matches!(err, FastNewsError::Push(_)));

        let stored = MarkerRepository::new(db.pool()).get("the_thao").await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_send_test_notification() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(db, sender.clone());

        let delivery = dispatcher.send_test_notification().await.unwrap();
        assert!(delivery.is_sent());

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent[0].topic, ALL_USERS_TOPIC);
        assert!(matches!(sent[0].data, PushData::Test { .. }));
    }

    #[tokio::test]
    async fn test_default_config_never_advances_marker() {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let sender = sender_from_config(&Config::default().push).unwrap();
        let dispatcher = Dispatcher::new(db.clone(), sender);

        let outcome = dispatcher.dispatch(&topic(), &article()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::DryRun);

        let stored = MarkerRepository::new(db.pool()).get("the_thao").await.unwrap();
        assert!(stored.is_none());
    }
}
