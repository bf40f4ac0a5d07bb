//! Ports - Interfaces for pluggable behavior.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the relay core and the code plugged into it. Adapters implement these ports.
//!
//! - `RoutingPolicy` - Decides who receives what when clients connect, talk, or leave

mod routing_policy;

pub use routing_policy::RoutingPolicy;
