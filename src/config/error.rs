//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Outbound queue capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("Hub request capacity must be greater than zero")]
    ZeroHubCapacity,

    #[error("Heartbeat timeouts must be greater than zero")]
    InvalidTimeout,

    #[error("Heartbeat timeouts must not exceed {max} seconds")]
    TimeoutTooLarge { max: u64 },

    #[error("Write wait must be shorter than pong wait")]
    WriteWaitNotBelowPongWait,

    #[error("Maximum message size must be greater than zero")]
    ZeroMessageSize,
}
