//! Marker handlers for the web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::marker::MarkerRepository;
use crate::web::dto::{ApiResponse, MarkerResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::FastNewsError;

/// GET /api/markers - List the markers of all topics.
pub async fn list_markers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MarkerResponse>>>, ApiError> {
    let markers = MarkerRepository::new(state.db.pool()).list().await?;

    let responses = markers.into_iter().map(MarkerResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/markers/:topic - Get the marker of one topic.
pub async fn get_marker(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> Result<Json<ApiResponse<MarkerResponse>>, ApiError> {
    let marker = MarkerRepository::new(state.db.pool())
        .get(&topic)
        .await?
        .ok_or_else(|| FastNewsError::NotFound(format!("marker for topic {topic}")))?;

    Ok(Json(ApiResponse::new(MarkerResponse::from(marker))))
}
