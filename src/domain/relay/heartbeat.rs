//! Heartbeat timing and frame limits.

use std::time::Duration;

/// Deadlines and limits the pumps enforce on every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Upper bound on a single write, pings included.
    pub write_wait: Duration,

    /// How long the read side waits for a pong before giving up.
    pub pong_wait: Duration,

    /// Interval between pings. Must be shorter than `pong_wait`.
    pub ping_period: Duration,

    /// Largest inbound frame accepted, in bytes. Bigger frames are fatal.
    pub max_message_size: usize,
}

impl HeartbeatConfig {
    pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);
    pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;

    /// Builds a config whose ping period is 90% of `pong_wait`.
    pub fn new(write_wait: Duration, pong_wait: Duration, max_message_size: usize) -> Self {
        Self {
            write_wait,
            pong_wait,
            ping_period: Self::ping_period_for(pong_wait),
            max_message_size,
        }
    }

    /// 90% of the liveness timeout, so a ping lands before the peer's deadline.
    pub fn ping_period_for(pong_wait: Duration) -> Duration {
        match pong_wait.checked_mul(9) {
            Some(scaled) => scaled / 10,
            None => pong_wait / 10 * 9,
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_WRITE_WAIT,
            Self::DEFAULT_PONG_WAIT,
            Self::DEFAULT_MAX_MESSAGE_SIZE,
        )
    }
}
