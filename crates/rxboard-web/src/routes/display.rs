//! Display board page.
//!
//! The page is rendered with the last payload already in it, so the first
//! paint does not wait for the WebSocket sync.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::Value;
use tracing::error;

use crate::state::DisplayState;

#[derive(Template)]
#[template(path = "display.html")]
struct DisplayTemplate {
    /// Script-safe JSON of the last payload, `null` when there is none.
    last_update_json: String,
    /// Script-safe JSON of the floating area flag, `null` when disabled.
    floating_area_json: String,
    notice: String,
}

/// GET / - Render the display board.
pub async fn index(State(state): State<DisplayState>) -> Response {
    let (latest, notice) = match state.broadcaster.latest().await {
        Ok(latest) => (latest, String::new()),
        Err(e) => {
            error!(error = %e, "Failed to load last payload for page render");
            (None, "Latest data is unavailable; waiting for live updates.".to_string())
        }
    };

    let floating_area = state.broadcaster.floating_area().map(Value::Bool);
    let template = DisplayTemplate {
        last_update_json: script_json(latest.as_ref()),
        floating_area_json: script_json(floating_area.as_ref()),
        notice,
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Template error: {}", e))).into_response(),
    }
}

/// Serialize a value for embedding inside a `<script>` element.
fn script_json(value: Option<&Value>) -> String {
    let json = value
        .and_then(|v| serde_json::to_string(v).ok())
        .unwrap_or_else(|| "null".to_string());
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_display_router, ServerConfig};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use rxboard_core::store::MemoryStore;
    use rxboard_core::Broadcaster;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(store: Arc<MemoryStore>) -> (Arc<Broadcaster>, axum::Router) {
        let broadcaster = Arc::new(Broadcaster::new(store, true));
        let state = DisplayState::new(broadcaster.clone(), None);
        (broadcaster, create_display_router(state, &ServerConfig::default()))
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_script_json_escapes_markup() {
        let value = json!({"note": "</script><b>&"});
        let out = script_json(Some(&value));
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('&'));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_script_json_none_is_null() {
        assert_eq!(script_json(None), "null");
    }

    #[tokio::test]
    async fn test_index_without_data_injects_null() {
        let (_b, app) = app(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("const LAST_UPDATE = null;"));
        assert!(body.contains("const FLOATING_AREA = false;"));
    }

    #[tokio::test]
    async fn test_index_injects_last_payload() {
        let (broadcaster, app) = app(Arc::new(MemoryStore::new()));
        broadcaster.refresh(json!({"bed": "7A"})).await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_string(response).await;
        assert!(body.contains(r#"const LAST_UPDATE = {"bed":"7A"};"#));
    }

    #[tokio::test]
    async fn test_internal_refresh_then_api_latest() {
        let (_b, app) = app(Arc::new(MemoryStore::new()));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/refresh")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"[{"drug":"insulin"}]"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/api/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["data"], json!([{"drug": "insulin"}]));
        assert_eq!(body["floating_area"], json!(false));
    }

    #[tokio::test]
    async fn test_internal_refresh_reports_persist_failure() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let (broadcaster, app) = app(store);
        let mut sub = broadcaster.connect().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/refresh")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sub.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_play_sound_unconfigured() {
        let (_b, app) = app(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(Request::builder().uri("/play-sound?dtype=x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_play_sound_runs_announcer() {
        use rxboard_core::announce::Announcer;

        let broadcaster = Arc::new(Broadcaster::new(Arc::new(MemoryStore::new()), false));
        let announcer = Announcer::from_command_line("true").unwrap();
        let state = DisplayState::new(broadcaster, Some(announcer));
        let app = create_display_router(state, &ServerConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/play-sound").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
