//! Top-level router: WebSocket endpoint, health check, and the static client.

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, WebSocketState};

use super::health::health;

/// Builds the application router.
///
/// - `GET /ws` upgrades to a relay connection
/// - `GET /health` reports liveness
/// - everything else is served from `static_dir`, falling back to its
///   `index.html` so client-side routes resolve
pub fn app_router(state: WebSocketState, static_dir: &Path) -> Router {
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(websocket_router())
        .route("/health", get(health))
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
