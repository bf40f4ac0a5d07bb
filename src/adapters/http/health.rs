//! Liveness endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::adapters::websocket::WebSocketState;

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub clients: usize,
}

/// Reports liveness and the number of registered clients.
///
/// Returns 503 once the hub loop has stopped.
pub async fn health(State(state): State<WebSocketState>) -> impl IntoResponse {
    match state.relay.hub.client_count().await {
        Ok(clients) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                clients,
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "hub stopped",
                clients: 0,
            }),
        ),
    }
}
