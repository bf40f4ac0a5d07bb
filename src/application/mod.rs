//! Application layer - the relay core.
//!
//! Coordinates connections without knowing anything about HTTP or axum:
//! - `hub` - connection registry owned by a single coordinating task
//! - `pumps` - per-connection read and write loops
//! - `session` - wires one connection into the hub and starts its pumps

pub mod hub;
pub mod pumps;
pub mod session;

pub use hub::{ClientHandle, Hub, HubHandle, HubStopped};
pub use pumps::PumpExit;
pub use session::{run_session, RelayContext};
