//! Failure taxonomy for connections and queues.

use thiserror::Error;

/// Fatal conditions that end a connection's pumps.
///
/// None of these reach the hub as errors; the pump that observes one stops and
/// the read side turns it into an ordinary unregister.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("no heartbeat received within the read deadline")]
    ReadTimeout,

    #[error("write did not complete within the write deadline")]
    WriteTimeout,

    #[error("inbound frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    /// Wraps any displayable transport error.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ConnectionError::Transport(err.to_string())
    }
}

/// Why a non-blocking enqueue onto an outbound queue did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// Queue at capacity; the consumer is not keeping up.
    #[error("outbound queue is full")]
    Full,

    /// Queue already released by the hub or its pump is gone.
    #[error("outbound queue is closed")]
    Closed,
}
