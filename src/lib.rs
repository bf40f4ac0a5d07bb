//! Relay Hub - WebSocket message relay
//!
//! Accepts WebSocket connections, tracks them in a central hub, and relays
//! JSON messages between them according to a routing policy chosen at startup
//! (echo back to the sender, or broadcast to everyone).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
