//! Spoken alert endpoint.

use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use rxboard_core::announce::announcement_text;
use serde::Deserialize;
use tracing::error;

use crate::state::DisplayState;

#[derive(Deserialize)]
pub struct PlaySoundQuery {
    pub dtype: Option<String>,
}

/// GET /play-sound?dtype=... - Speak an alert label on the server host.
pub async fn play_sound(
    State(state): State<DisplayState>,
    Query(query): Query<PlaySoundQuery>,
) -> (StatusCode, String) {
    let Some(announcer) = &state.announcer else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Announcements are not configured".to_string(),
        );
    };

    let text = announcement_text(query.dtype.as_deref());
    match announcer.announce(text).await {
        Ok(()) => (StatusCode::OK, "Announcement played".to_string()),
        Err(e) => {
            error!(error = %e, text = %text, "Announcement failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Announcement failed".to_string(),
            )
        }
    }
}
