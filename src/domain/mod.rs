//! Domain layer containing relay types.
//!
//! # Module Organization
//!
//! - `relay` - Client ids, message envelope, wire frames, heartbeat timing, errors

pub mod relay;
