//! Routing policy implementations.
//!
//! - [`EchoPolicy`] - replies only to the sender
//! - [`BroadcastPolicy`] - relays every message to every connected client
//!
//! [`build_policy`] resolves the configured [`RoutingMode`] once at startup.

mod broadcast;
mod echo;

pub use broadcast::BroadcastPolicy;
pub use echo::EchoPolicy;

use std::sync::Arc;

use crate::application::hub::HubHandle;
use crate::config::RoutingMode;
use crate::ports::RoutingPolicy;

/// Builds the policy selected by `mode`.
pub fn build_policy(mode: RoutingMode, hub: HubHandle) -> Arc<dyn RoutingPolicy> {
    match mode {
        RoutingMode::Echo => Arc::new(EchoPolicy::new(hub)),
        RoutingMode::Broadcast => Arc::new(BroadcastPolicy::new(hub)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hub::Hub;

    #[tokio::test]
    async fn build_policy_matches_mode() {
        let hub = Hub::spawn(4);
        assert_eq!(build_policy(RoutingMode::Echo, hub.clone()).name(), "echo");
        assert_eq!(build_policy(RoutingMode::Broadcast, hub).name(), "broadcast");
    }
}
