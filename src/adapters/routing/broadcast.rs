//! BroadcastPolicy - relays every message to every connected client.

use async_trait::async_trait;
use tracing::warn;

use crate::application::hub::{ClientHandle, HubHandle};
use crate::domain::relay::Message;
use crate::ports::RoutingPolicy;

/// Re-serializes each inbound message unchanged and hands it to the hub's
/// broadcast. The sender receives its own message too.
pub struct BroadcastPolicy {
    hub: HubHandle,
}

impl BroadcastPolicy {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl RoutingPolicy for BroadcastPolicy {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn on_connect(&self, client: &ClientHandle) {
        self.hub
            .send_to(client, &Message::system("Welcome! (broadcast mode)."))
            .await;
    }

    async fn on_message(&self, client: &ClientHandle, message: Message) {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(client_id = %client.id(), error = %e, "failed to encode message");
                return;
            }
        };
        if self.hub.broadcast(frame).await.is_err() {
            warn!(client_id = %client.id(), "hub is not running, broadcast dropped");
        }
    }

    async fn on_disconnect(&self, _client: &ClientHandle) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hub::{Hub, OutboundQueue};
    use crate::domain::relay::ClientId;

    async fn registered(hub: &HubHandle, id: &str) -> (ClientHandle, OutboundQueue) {
        let (client, queue) = ClientHandle::new(ClientId::new(id), 8);
        hub.register(client.clone()).await.unwrap();
        (client, queue)
    }

    #[tokio::test]
    async fn welcome_goes_to_new_client() {
        let hub = Hub::spawn(16);
        let policy = BroadcastPolicy::new(hub.clone());
        let (a, mut qa) = registered(&hub, "a").await;

        policy.on_connect(&a).await;

        assert_eq!(
            qa.next().await.as_deref(),
            Some(r#"{"type":"system","payload":"Welcome! (broadcast mode)."}"#)
        );
    }

    #[tokio::test]
    async fn message_reaches_everyone_including_sender() {
        let hub = Hub::spawn(16);
        let policy = BroadcastPolicy::new(hub.clone());
        let (a, mut qa) = registered(&hub, "A").await;
        let (_b, mut qb) = registered(&hub, "B").await;

        policy
            .on_message(&a, Message::new("message", "A", "hi"))
            .await;

        let expected = r#"{"type":"message","sender":"A","payload":"hi"}"#;
        assert_eq!(qa.next().await.as_deref(), Some(expected));
        assert_eq!(qb.next().await.as_deref(), Some(expected));
    }
}
