//! WebSocket upgrade handler for relay connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the socket to the relay:
//! 1. Check the request origin
//! 2. Apply the inbound frame size limit to the upgrade
//! 3. Upgrade to WebSocket
//! 4. Split the socket and run the session (register, pumps, teardown)

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{future, SinkExt, StreamExt};

use crate::adapters::http::OriginPolicy;
use crate::application::session::{run_session, RelayContext};
use crate::domain::relay::{ClientId, Frame};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Hub, routing policy and per-connection limits.
    pub relay: RelayContext,
    /// Which browser origins may connect.
    pub origins: OriginPolicy,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(relay: RelayContext, origins: OriginPolicy) -> Self {
        Self { relay, origins }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
///
/// The client id is the peer address when the server was started with
/// connect info, otherwise a random session id.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    State(state): State<WebSocketState>,
) -> Response {
    let origin = headers.get(ORIGIN);
    if !state.origins.allows(origin) {
        tracing::warn!(origin = ?origin, "rejected websocket origin");
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    let client_id = match peer {
        Some(ConnectInfo(addr)) => ClientId::from_peer(addr),
        None => ClientId::generate(),
    };
    let limit = state.relay.heartbeat.max_message_size;

    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_failed_upgrade(|e| tracing::warn!("websocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, client_id, state.relay))
}

/// Run an established WebSocket connection until its read side ends.
async fn handle_socket(socket: WebSocket, client_id: ClientId, relay: RelayContext) {
    let (sender, receiver) = socket.split();

    let sink = sender.with(|frame: Frame| future::ready(Ok::<Message, axum::Error>(frame.into())));
    let stream = receiver.map(|result| result.map(Frame::from));

    let exit = run_session(sink, stream, client_id.clone(), relay).await;
    tracing::debug!(client_id = %client_id, exit = ?exit, "websocket session ended");
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(websocket_router())
///     .with_state(ws_state);
/// ```
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
