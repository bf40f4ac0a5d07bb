//! WebSocket adapter - binds axum WebSockets to the relay core.
//!
//! # Components
//!
//! - [`messages`] - axum `Message` <-> relay `Frame` conversion
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;

pub use handler::{websocket_router, ws_handler, WebSocketState};
