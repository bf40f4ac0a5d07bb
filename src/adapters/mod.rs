//! Adapters - Implementations of port interfaces and transport bindings.
//!
//! - `routing` - Echo and broadcast routing policies
//! - `websocket` - axum WebSocket upgrade and frame conversion
//! - `http` - Router, health check, static files, origin check

pub mod http;
pub mod routing;
pub mod websocket;

pub use http::{app_router, OriginPolicy};
pub use routing::{build_policy, BroadcastPolicy, EchoPolicy};
pub use websocket::WebSocketState;
