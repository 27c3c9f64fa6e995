//! rxboard Web Server
//!
//! Two independent Axum applications: the display board (page, WebSocket
//! fan-out, JSON API) and the patient relationship lookup.

pub mod config;
pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use config::ServerConfig;
use state::{DisplayState, LookupState};

/// Create the display board router.
pub fn create_display_router(state: DisplayState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/latest", get(routes::api::latest))
        .with_state(state.clone());

    let router = Router::new()
        .route("/", get(routes::display::index))
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .route("/internal/refresh", post(routes::internal::refresh))
        .route("/play-sound", get(routes::announce::play_sound))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    match &config.public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Create the patient lookup router.
pub fn create_lookup_router(state: LookupState) -> Router {
    Router::new()
        .route("/", get(routes::lookup::form))
        .route("/search", post(routes::lookup::search))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the display board server.
pub async fn run_display_server(state: DisplayState, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_display_router(state, &config);
    serve(app, &config, "Display server").await
}

/// Run the patient lookup server.
pub async fn run_lookup_server(state: LookupState, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_lookup_router(state);
    serve(app, &config, "Lookup server").await
}

async fn serve(app: Router, config: &ServerConfig, name: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("{} listening on http://{}", name, listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
