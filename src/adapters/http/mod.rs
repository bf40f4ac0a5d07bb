//! HTTP adapters - the routes around the relay.
//!
//! - [`router`] - assembles `/ws`, `/health` and static file serving
//! - [`origin`] - origin allow-list for WebSocket upgrades
//! - [`health`] - liveness endpoint

pub mod health;
pub mod origin;
pub mod router;

pub use health::{health, HealthResponse};
pub use origin::OriginPolicy;
pub use router::app_router;
