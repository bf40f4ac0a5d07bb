//! RoutingPolicy port - Pluggable decision logic for inbound traffic.
//!
//! The relay core knows nothing about what messages mean. It reports three
//! lifecycle events per connection and the active policy decides what to
//! enqueue and for whom.
//!
//! ## Contract
//!
//! - `on_connect` runs once, after the client is registered with the hub and
//!   before any inbound message is read.
//! - `on_message` runs once per decoded message, on the client's inbound pump.
//! - `on_disconnect` runs exactly once, after the client was unregistered.
//!
//! Callbacks must stay short and must not wait on anything unbounded. A slow
//! callback stalls the inbound pump that invoked it. Delivery should go through
//! [`HubHandle::send_to`](crate::application::hub::HubHandle::send_to) or
//! [`HubHandle::broadcast`](crate::application::hub::HubHandle::broadcast),
//! both of which are non-blocking towards client queues.

use async_trait::async_trait;

use crate::application::hub::ClientHandle;
use crate::domain::relay::Message;

/// Strategy that maps connection events to outbound deliveries.
///
/// Selected once at startup and shared by every connection.
#[async_trait]
pub trait RoutingPolicy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// A client finished its handshake and was registered.
    async fn on_connect(&self, client: &ClientHandle);

    /// A message arrived from `client`. Its sender is never empty.
    async fn on_message(&self, client: &ClientHandle, message: Message);

    /// `client` is gone and will never be seen again.
    async fn on_disconnect(&self, client: &ClientHandle);
}
