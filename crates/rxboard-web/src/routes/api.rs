//! JSON API for the display board.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

use crate::state::DisplayState;

#[derive(Serialize)]
pub struct LatestResponse {
    /// `null` when nothing was ever published.
    pub data: Option<Value>,
    pub floating_area: Option<bool>,
    pub subscribers: usize,
}

/// GET /api/latest - The persisted payload.
pub async fn latest(
    State(state): State<DisplayState>,
) -> Result<Json<LatestResponse>, (StatusCode, String)> {
    let data = state
        .broadcaster
        .latest()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(LatestResponse {
        data,
        floating_area: state.broadcaster.floating_area(),
        subscribers: state.broadcaster.subscriber_count(),
    }))
}
