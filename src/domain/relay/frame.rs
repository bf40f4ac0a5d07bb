//! Transport frames.

use std::sync::Arc;

/// A serialized message waiting in an outbound queue.
///
/// Shared so a single broadcast can sit in many queues without copying.
pub type OutboundFrame = Arc<str>;

/// One discrete unit read from or written to a connection.
///
/// Mirrors the WebSocket frame kinds the pumps care about. Ping and pong carry
/// the heartbeat subprotocol and never reach the routing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    /// Close handshake. `code` is `None` when the peer sent no status.
    Close { code: Option<u16> },
}

impl Frame {
    /// Normal closure.
    pub const CLOSE_NORMAL: u16 = 1000;
    /// Endpoint going away (browser tab closed, server shutdown).
    pub const CLOSE_GOING_AWAY: u16 = 1001;
    /// Reserved code reported when a connection drops without a close frame.
    pub const CLOSE_ABNORMAL: u16 = 1006;

    /// Size of the application payload carried by this frame.
    pub fn payload_len(&self) -> usize {
        match self {
            Frame::Text(text) => text.len(),
            Frame::Binary(data) | Frame::Ping(data) | Frame::Pong(data) => data.len(),
            Frame::Close { .. } => 0,
        }
    }

    /// Whether a close with this code is one a well-behaved peer would send.
    ///
    /// A missing code counts as expected, as do normal, going-away and
    /// abnormal closure. Anything else is worth a warning.
    pub fn is_expected_close(code: Option<u16>) -> bool {
        matches!(
            code,
            None | Some(Self::CLOSE_NORMAL)
                | Some(Self::CLOSE_GOING_AWAY)
                | Some(Self::CLOSE_ABNORMAL)
        )
    }
}
