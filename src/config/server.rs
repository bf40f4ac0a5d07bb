//! Server configuration

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use super::error::ValidationError;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Frontend build directory served for every non-WebSocket path
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Origins allowed to open a WebSocket (comma-separated).
    /// Unset or empty accepts any origin.
    pub allowed_origins: Option<String>,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Get the socket address to bind to. `host` must be an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ValidationError::InvalidAddress(format!("{}:{}", self.host, self.port)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Override host and port from a `host:port` or `:port` string.
    ///
    /// An empty host (`:8080`) binds every interface.
    pub fn set_addr(&mut self, addr: &str) -> Result<(), ValidationError> {
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| ValidationError::InvalidAddress(addr.to_string()))?;
        let port: u16 = port
            .parse()
            .map_err(|_| ValidationError::InvalidAddress(addr.to_string()))?;

        self.host = if host.is_empty() {
            default_host()
        } else {
            host.trim_start_matches('[').trim_end_matches(']').to_string()
        };
        self.port = port;
        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get allowed origins as a vector
    pub fn allowed_origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if self.is_production() && self.allowed_origins_list().is_empty() {
            return Err(ValidationError::MissingRequired("server.allowed_origins"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            static_dir: default_static_dir(),
            allowed_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,relay_hub=debug,tower_http=info".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("../frontend/dist")
}
