//! Internal publishing endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::{debug, info};

use crate::state::DisplayState;

/// POST /internal/refresh - Publish a payload over HTTP.
///
/// Same semantics as a `refreshData` WebSocket event: persist, then
/// broadcast to every display client.
pub async fn refresh(
    State(state): State<DisplayState>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, (StatusCode, String)> {
    debug!(
        subscribers = state.broadcaster.subscriber_count(),
        "Received payload over HTTP"
    );
    state
        .broadcaster
        .refresh(payload)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    info!("Payload published over HTTP");
    Ok(StatusCode::OK)
}
