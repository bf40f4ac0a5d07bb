//! EchoPolicy - answers each message to its sender only.

use async_trait::async_trait;

use crate::application::hub::{ClientHandle, HubHandle};
use crate::domain::relay::{Message, ECHO_TYPE, SERVER_SENDER};
use crate::ports::RoutingPolicy;

/// Replies to every message with `Echo: <payload>`, addressed to the sender
/// alone. Never touches the hub's broadcast path.
pub struct EchoPolicy {
    hub: HubHandle,
}

impl EchoPolicy {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    fn welcome(client: &ClientHandle) -> Message {
        Message::system(format!("Welcome! (echo mode). Your id: {}", client.id()))
    }

    fn reply(message: &Message) -> Message {
        Message::new(ECHO_TYPE, SERVER_SENDER, format!("Echo: {}", message.payload()))
    }
}

#[async_trait]
impl RoutingPolicy for EchoPolicy {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn on_connect(&self, client: &ClientHandle) {
        self.hub.send_to(client, &Self::welcome(client)).await;
    }

    async fn on_message(&self, client: &ClientHandle, message: Message) {
        self.hub.send_to(client, &Self::reply(&message)).await;
    }

    async fn on_disconnect(&self, _client: &ClientHandle) {}
}
