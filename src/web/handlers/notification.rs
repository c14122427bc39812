//! Test notification handler.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::push::Delivery;
use crate::web::dto::TestNotificationResponse;
use crate::web::handlers::AppState;

/// POST /api/test-notification - Send the test notification to all users.
pub async fn test_notification(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<TestNotificationResponse>) {
    match state.dispatcher.send_test_notification().await {
        Ok(Delivery::Sent(_)) => (StatusCode::OK, Json(TestNotificationResponse::sent())),
        Ok(Delivery::Logged) => (StatusCode::OK, Json(TestNotificationResponse::logged())),
        Err(e) => {
            tracing::error!("Test notification failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TestNotificationResponse::failed(e.to_string())),
            )
        }
    }
}
