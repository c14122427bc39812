//! Push sender abstraction.

use async_trait::async_trait;
use tracing::info;

use crate::push::message::PushMessage;
use crate::Result;

/// What the push channel did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the push channel, with the channel's message ID.
    Sent(String),
    /// Only written to the log. No subscriber received it.
    Logged,
}

impl Delivery {
    /// Whether the message reached the push channel.
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent(_))
    }
}

/// Sends a message to every subscriber of its topic.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Send `message` to its topic.
    async fn send(&self, message: &PushMessage) -> Result<Delivery>;
}

/// Sender that only logs messages. Used when push delivery is disabled.
#[derive(Debug, Default)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, message: &PushMessage) -> Result<Delivery> {
        let data = message.data.to_data_map()?;
        info!(
            topic = %message.topic,
            title = %message.notification.title,
            body = %message.notification.body,
            data_keys = data.len(),
            "Push delivery disabled, message logged only"
        );
        Ok(Delivery::Logged)
    }
}
