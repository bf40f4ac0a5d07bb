//! Per-connection pump pair.
//!
//! Each connection gets exactly two tasks:
//!
//! - [`run_inbound_pump`] owns the read half. It decodes frames into
//!   [`Message`](crate::domain::relay::Message)s, hands them to the routing
//!   policy, and on exit unregisters the client and notifies the policy.
//! - [`run_outbound_pump`] owns the write half. It drains the client's queue,
//!   sends heartbeat pings, and closes the connection when the hub releases
//!   the queue. A failed write releases the queue itself.
//!
//! The queue's close signal ties the two together: once it fires, for any
//! reason, the inbound pump stops reading and tears the client down.
//!
//! Both are generic over `futures` streams and sinks of [`Frame`]s so they run
//! the same over an axum WebSocket or an in-memory channel.
//!
//! [`Frame`]: crate::domain::relay::Frame

mod inbound;
mod outbound;

pub use inbound::run_inbound_pump;
pub use outbound::run_outbound_pump;

use crate::domain::relay::ConnectionError;

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The peer closed the connection or the stream ended.
    PeerClosed,

    /// The client's outbound queue was released, by the hub or by a failed
    /// write on the other half of the connection.
    QueueClosed,

    /// The hub would not register the client.
    Refused,

    /// A deadline lapsed or the transport failed.
    Failed(ConnectionError),
}
