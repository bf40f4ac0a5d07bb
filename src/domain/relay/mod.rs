//! Relay domain - value types shared by the hub, the pumps and the routing policies.
//!
//! Nothing in here touches a socket or a task. The types describe what flows
//! through the relay:
//!
//! - [`Message`] - the JSON envelope clients exchange
//! - [`ClientId`] - identity of one live connection
//! - [`Frame`] - one transport-level unit read from or written to a connection
//! - [`HeartbeatConfig`] - deadlines and limits enforced by the pumps
//! - [`ConnectionError`] / [`EnqueueError`] - failure taxonomy

mod client_id;
mod errors;
mod frame;
mod heartbeat;
mod message;

pub use client_id::ClientId;
pub use errors::{ConnectionError, EnqueueError};
pub use frame::{Frame, OutboundFrame};
pub use heartbeat::HeartbeatConfig;
pub use message::{Message, ECHO_TYPE, MESSAGE_TYPE, SERVER_SENDER, SYSTEM_TYPE};
