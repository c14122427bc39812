//! Firebase Cloud Messaging (HTTP v1) sender.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PushConfig;
use crate::error::{FastNewsError, Result};
use crate::push::auth::{ServiceAccountKey, TokenProvider};
use crate::push::message::{PushMessage, CLICK_ACTION};
use crate::push::sender::{Delivery, PushSender};

/// Request timeout for the push API.
const SEND_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: WireMessage<'a>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    topic: &'a str,
    notification: WireNotification<'a>,
    data: BTreeMap<String, String>,
    android: AndroidConfig<'a>,
}

#[derive(Debug, Serialize)]
struct WireNotification<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AndroidConfig<'a> {
    notification: AndroidNotification<'a>,
}

#[derive(Debug, Serialize)]
struct AndroidNotification<'a> {
    click_action: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

/// Build the JSON body for the FCM `messages:send` call.
fn build_request_body(message: &PushMessage) -> Result<serde_json::Value> {
    let request = SendRequest {
        message: WireMessage {
            topic: &message.topic,
            notification: WireNotification {
                title: &message.notification.title,
                body: &message.notification.body,
                image: message.data.image_url(),
            },
            data: message.data.to_data_map()?,
            android: AndroidConfig {
                notification: AndroidNotification {
                    click_action: CLICK_ACTION,
                },
            },
        },
    };
    serde_json::to_value(&request)
        .map_err(|e| FastNewsError::Push(format!("failed to encode message: {e}")))
}

/// Sends messages to FCM topics.
pub struct FcmPushSender {
    client: Client,
    send_url: String,
    tokens: TokenProvider,
}

impl FcmPushSender {
    /// Create a sender from the push configuration.
    ///
    /// A service account key takes precedence over a static access token.
    pub fn new(config: &PushConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| FastNewsError::Push(format!("failed to create HTTP client: {e}")))?;

        let tokens = if !config.credentials_path.is_empty() {
            let key = ServiceAccountKey::load(&config.credentials_path)?;
            TokenProvider::service_account(key, client.clone())?
        } else if !config.access_token.is_empty() {
            TokenProvider::fixed(config.access_token.clone())
        } else {
            return Err(FastNewsError::Config(
                "push credentials are not configured".to_string(),
            ));
        };

        Ok(Self::with_token_provider(
            client,
            &config.endpoint,
            &config.project_id,
            tokens,
        ))
    }

    /// Create a sender with an explicit token provider.
    pub fn with_token_provider(
        client: Client,
        endpoint: &str,
        project_id: &str,
        tokens: TokenProvider,
    ) -> Self {
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            endpoint.trim_end_matches('/'),
            project_id
        );
        Self {
            client,
            send_url,
            tokens,
        }
    }

    /// URL messages are posted to.
    pub fn send_url(&self) -> &str {
        &self.send_url
    }
}

#[async_trait]
impl PushSender for FcmPushSender {
    async fn send(&self, message: &PushMessage) -> Result<Delivery> {
        let body = build_request_body(message)?;
        let token = self.tokens.token().await?;

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| FastNewsError::Push(format!("send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FastNewsError::Push(format!(
                "FCM rejected message for topic {}: {}: {}",
                message.topic, status, text
            )));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| FastNewsError::Push(format!("invalid FCM response: {e}")))?;
        debug!("FCM accepted message {}", sent.name);
        Ok(Delivery::Sent(sent.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Article, ParsedItem};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_send_url() {
        let sender = FcmPushSender::with_token_provider(
            Client::new(),
            "https://fcm.googleapis.com/",
            "fastnews-app",
            TokenProvider::fixed("t"),
        );
        assert_eq!(
            sender.send_url(),
            "https://fcm.googleapis.com/v1/projects/fastnews-app/messages:send"
        );
    }

    #[test]
    fn test_new_requires_credentials() {
        let config = PushConfig {
            enabled: true,
            project_id: "fastnews-app".to_string(),
            ..PushConfig::default()
        };
        assert!(FcmPushSender::new(&config).is_err());

        let config = PushConfig {
            access_token: "token".to_string(),
            ..config
        };
        assert!(FcmPushSender::new(&config).is_ok());
    }

    #[test]
    fn test_article_request_body() {
        let article = Article::from_item(
            ParsedItem {
                title: "Bão số 3".to_string(),
                link: "https://thanhnien.vn/bao-so-3.htm".to_string(),
                description: r#"<img src="https://thanhnien.vn/bao.jpg">"#.to_string(),
                published_at: None,
            },
            "Thanh Niên",
        );
        let message = PushMessage::article("all_users", "Tin tức mới", &article);

        let body = build_request_body(&message).unwrap();
        let msg = &body["message"];
        assert_eq!(msg["topic"], "all_users");
        assert_eq!(msg["notification"]["title"], "📰 Tin tức mới");
        assert_eq!(msg["notification"]["body"], "Bão số 3");
        assert_eq!(msg["notification"]["image"], "https://thanhnien.vn/bao.jpg");
        assert_eq!(msg["data"]["kind"], "article");
        assert!(msg["data"]["article"].is_string());
        assert_eq!(msg["android"]["notification"]["click_action"], CLICK_ACTION);
    }

    #[test]
    fn test_test_request_body_has_no_image() {
        let sent_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let body = build_request_body(&PushMessage::test("all_users", sent_at)).unwrap();

        assert!(body["message"]["notification"].get("image").is_none());
        assert_eq!(body["message"]["data"]["test"], "true");
    }
}
