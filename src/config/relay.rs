//! Relay configuration (routing mode, queues, heartbeat)

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::domain::relay::HeartbeatConfig;

use super::error::ValidationError;

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Routing policy applied to every connection
    #[serde(default)]
    pub mode: RoutingMode,

    /// Capacity of each client's outbound queue, in frames
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Capacity of the hub's request channel
    #[serde(default = "default_hub_request_capacity")]
    pub hub_request_capacity: usize,

    /// Deadline for a single write, in seconds
    #[serde(default = "default_write_wait")]
    pub write_wait_secs: u64,

    /// Read deadline refreshed by each pong, in seconds
    #[serde(default = "default_pong_wait")]
    pub pong_wait_secs: u64,

    /// Largest inbound frame accepted, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

/// Available routing policies
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Reply to the sender only
    #[default]
    Echo,
    /// Relay every message to every client
    Broadcast,
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::Echo => write!(f, "echo"),
            RoutingMode::Broadcast => write!(f, "broadcast"),
        }
    }
}

impl RelayConfig {
    /// Longest accepted write wait or pong wait, in seconds (one day).
    pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

    /// Heartbeat settings for the pumps. Ping period is derived from pong wait.
    pub fn heartbeat(&self) -> HeartbeatConfig {
        HeartbeatConfig::new(
            Duration::from_secs(self.write_wait_secs),
            Duration::from_secs(self.pong_wait_secs),
            self.max_message_size,
        )
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::ZeroQueueCapacity);
        }
        if self.hub_request_capacity == 0 {
            return Err(ValidationError::ZeroHubCapacity);
        }
        if self.write_wait_secs == 0 || self.pong_wait_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.write_wait_secs > Self::MAX_TIMEOUT_SECS
            || self.pong_wait_secs > Self::MAX_TIMEOUT_SECS
        {
            return Err(ValidationError::TimeoutTooLarge {
                max: Self::MAX_TIMEOUT_SECS,
            });
        }
        if self.write_wait_secs >= self.pong_wait_secs {
            return Err(ValidationError::WriteWaitNotBelowPongWait);
        }
        if self.max_message_size == 0 {
            return Err(ValidationError::ZeroMessageSize);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: RoutingMode::default(),
            queue_capacity: default_queue_capacity(),
            hub_request_capacity: default_hub_request_capacity(),
            write_wait_secs: default_write_wait(),
            pong_wait_secs: default_pong_wait(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_hub_request_capacity() -> usize {
    256
}

fn default_write_wait() -> u64 {
    HeartbeatConfig::DEFAULT_WRITE_WAIT.as_secs()
}

fn default_pong_wait() -> u64 {
    HeartbeatConfig::DEFAULT_PONG_WAIT.as_secs()
}

fn default_max_message_size() -> usize {
    HeartbeatConfig::DEFAULT_MAX_MESSAGE_SIZE
}
