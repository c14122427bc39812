//! Response bodies for the web API.

use serde::Serialize;

use crate::marker::NotificationMarker;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Marker as returned by the API.
#[derive(Debug, Serialize)]
pub struct MarkerResponse {
    pub topic: String,
    pub link: String,
    pub title: String,
    pub notified_at: String,
}

impl From<NotificationMarker> for MarkerResponse {
    fn from(marker: NotificationMarker) -> Self {
        Self {
            topic: marker.topic,
            link: marker.link,
            title: marker.title,
            notified_at: marker.notified_at.to_rfc3339(),
        }
    }
}

/// Result of the test notification trigger.
#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestNotificationResponse {
    /// Successful send.
    pub fn sent() -> Self {
        Self {
            success: true,
            message: Some("Test notification sent!".to_string()),
            error: None,
        }
    }

    /// Push delivery is disabled and the message was only logged.
    pub fn logged() -> Self {
        Self {
            success: true,
            message: Some("Test notification logged (push delivery disabled)".to_string()),
            error: None,
        }
    }

    /// Failed send.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
