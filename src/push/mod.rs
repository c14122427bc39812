//! Push notification delivery for FastNews.

pub mod auth;
pub mod fcm;
pub mod message;
pub mod sender;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use fcm::FcmPushSender;
pub use message::{
    extract_image_url, ArticlePayload, Notification, PushData, PushMessage, CLICK_ACTION,
    MAX_DATA_PAYLOAD_BYTES, MAX_DESCRIPTION_BYTES,
};
pub use sender::{Delivery, LogPushSender, PushSender};

use std::sync::Arc;

use tracing::info;

use crate::config::PushConfig;
use crate::Result;

/// Build the sender selected by the push configuration.
pub fn sender_from_config(config: &PushConfig) -> Result<Arc<dyn PushSender>> {
    if config.enabled {
        info!("Push delivery enabled for project {}", config.project_id);
        Ok(Arc::new(FcmPushSender::new(config)?))
    } else {
        info!("Push delivery disabled; notifications are logged and markers stay unchanged");
        Ok(Arc::new(LogPushSender))
    }
}
