//! Connection lifecycle - wires one accepted connection into the relay.
//!
//! 1. Create the client handle and its bounded outbound queue
//! 2. Register with the hub
//! 3. Notify the routing policy (`on_connect`)
//! 4. Spawn the outbound pump
//! 5. Run the inbound pump until the connection ends
//!
//! The pumps share the client's queue close signal, so whichever half fails
//! first brings the other one down.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, Stream};
use tracing::warn;

use crate::domain::relay::{ClientId, Frame, HeartbeatConfig};
use crate::ports::RoutingPolicy;

use super::hub::{ClientHandle, HubHandle};
use super::pumps::{run_inbound_pump, run_outbound_pump, PumpExit};

/// Everything a new connection needs, shared by all connections.
#[derive(Clone)]
pub struct RelayContext {
    pub hub: HubHandle,
    pub policy: Arc<dyn RoutingPolicy>,
    pub heartbeat: HeartbeatConfig,
    pub queue_capacity: usize,
}

impl RelayContext {
    pub fn new(
        hub: HubHandle,
        policy: Arc<dyn RoutingPolicy>,
        heartbeat: HeartbeatConfig,
        queue_capacity: usize,
    ) -> Self {
        Self {
            hub,
            policy,
            heartbeat,
            queue_capacity,
        }
    }
}

/// Runs one connection from registration to teardown.
///
/// Returns when the inbound pump stops. A failed write ends the inbound pump
/// too. The outbound pump finishes on its own task once the queue is released.
pub async fn run_session<Si, St, E>(sink: Si, stream: St, client_id: ClientId, ctx: RelayContext) -> PumpExit
where
    Si: Sink<Frame> + Unpin + Send + 'static,
    Si::Error: Display,
    St: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    let (client, queue) = ClientHandle::new(client_id.clone(), ctx.queue_capacity);

    match ctx.hub.register(client.clone()).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(client_id = %client_id, "client id already connected, dropping connection");
            client.close();
            return PumpExit::Refused;
        }
        Err(_) => {
            warn!(client_id = %client_id, "hub is not running, dropping connection");
            client.close();
            return PumpExit::Refused;
        }
    }
    ctx.policy.on_connect(&client).await;

    tokio::spawn(run_outbound_pump(sink, queue, ctx.heartbeat, client_id));

    run_inbound_pump(stream, client, ctx.hub, ctx.policy, ctx.heartbeat).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hub::Hub;
    use crate::domain::relay::Message;
    use async_trait::async_trait;
    use futures::channel::mpsc;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time;

    /// Welcomes every client and echoes payloads back through the hub.
    #[derive(Default)]
    struct CountingPolicy {
        hub: std::sync::OnceLock<HubHandle>,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
    }

    #[async_trait]
    impl RoutingPolicy for CountingPolicy {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn on_connect(&self, client: &ClientHandle) {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if let Some(hub) = self.hub.get() {
                hub.send_to(client, &Message::system("welcome")).await;
            }
        }

        async fn on_message(&self, client: &ClientHandle, message: Message) {
            if let Some(hub) = self.hub.get() {
                hub.send_to(client, &message).await;
            }
        }

        async fn on_disconnect(&self, _client: &ClientHandle) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn context(policy: Arc<CountingPolicy>, hub: HubHandle) -> RelayContext {
        let _ = policy.hub.set(hub.clone());
        RelayContext::new(
            hub,
            policy,
            HeartbeatConfig::new(Duration::from_secs(10), Duration::from_secs(60), 512),
            8,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn session_registers_welcomes_and_relays() {
        let hub = Hub::spawn(16);
        let policy = Arc::new(CountingPolicy::default());
        let ctx = context(policy.clone(), hub.clone());

        let (sink, mut written) = mpsc::unbounded::<Frame>();
        let (frames, stream) = mpsc::unbounded::<Result<Frame, String>>();
        let session = tokio::spawn(run_session(sink, stream, ClientId::new("X"), ctx));

        assert_eq!(
            written.next().await,
            Some(Frame::Text(r#"{"type":"system","payload":"welcome"}"#.into()))
        );
        assert_eq!(hub.client_count().await.unwrap(), 1);

        frames.unbounded_send(Ok(Frame::Text("hello".into()))).unwrap();
        assert_eq!(
            written.next().await,
            Some(Frame::Text(r#"{"type":"message","sender":"X","payload":"hello"}"#.into()))
        );

        drop(frames);
        assert_eq!(session.await.unwrap(), PumpExit::PeerClosed);
        assert_eq!(hub.client_count().await.unwrap(), 0);
        assert_eq!(
            written.next().await,
            Some(Frame::Close { code: Some(Frame::CLOSE_NORMAL) })
        );
        assert_eq!(policy.connects.load(Ordering::SeqCst), 1);
        assert_eq!(policy.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_ends_the_session_and_tears_down_once() {
        let hub = Hub::spawn(16);
        let policy = Arc::new(CountingPolicy::default());
        let ctx = context(policy.clone(), hub.clone());

        let (sink, written) = mpsc::unbounded::<Frame>();
        let (frames, stream) = mpsc::unbounded::<Result<Frame, String>>();
        // The welcome write fails because nobody reads the other end.
        drop(written);
        let session = tokio::spawn(run_session(sink, stream, ClientId::new("X"), ctx));

        time::advance(Duration::from_secs(30)).await;
        frames.unbounded_send(Ok(Frame::Pong(Vec::new()))).ok();
        time::advance(Duration::from_secs(1)).await;

        let exit = time::timeout(Duration::from_secs(1), session)
            .await
            .expect("session should end once the write half fails")
            .unwrap();
        assert_eq!(exit, PumpExit::QueueClosed);
        assert_eq!(hub.client_count().await.unwrap(), 0);
        assert_eq!(policy.connects.load(Ordering::SeqCst), 1);
        assert_eq!(policy.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn messages_are_not_routed_after_the_write_half_fails() {
        let hub = Hub::spawn(16);
        let policy = Arc::new(CountingPolicy::default());
        let ctx = context(policy.clone(), hub.clone());

        let (sink, written) = mpsc::unbounded::<Frame>();
        let (frames, stream) = mpsc::unbounded::<Result<Frame, String>>();
        drop(written);

        let exit = run_session(sink, stream, ClientId::new("X"), ctx).await;
        assert_eq!(exit, PumpExit::QueueClosed);

        assert!(frames.unbounded_send(Ok(Frame::Text("late".into()))).is_err());
        assert_eq!(policy.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_client_id_is_refused() {
        let hub = Hub::spawn(16);
        let policy = Arc::new(CountingPolicy::default());
        let ctx = context(policy.clone(), hub.clone());

        let (existing, _existing_queue) = ClientHandle::new(ClientId::new("X"), 8);
        assert!(hub.register(existing).await.unwrap());

        let (sink, mut written) = mpsc::unbounded::<Frame>();
        let (_frames, stream) = mpsc::unbounded::<Result<Frame, String>>();
        let exit = run_session(sink, stream, ClientId::new("X"), ctx).await;

        assert_eq!(exit, PumpExit::Refused);
        assert_eq!(hub.client_count().await.unwrap(), 1);
        assert_eq!(policy.connects.load(Ordering::SeqCst), 0);
        assert_eq!(policy.disconnects.load(Ordering::SeqCst), 0);
        // The sink was dropped without anything being written.
        assert_eq!(written.next().await, None);
    }

    #[tokio::test]
    async fn stopped_hub_refuses_the_session() {
        let (hub, handle) = Hub::new(1);
        drop(hub);
        let policy = Arc::new(CountingPolicy::default());
        let ctx = context(policy.clone(), handle);

        let (sink, _written) = mpsc::unbounded::<Frame>();
        let (_frames, stream) = mpsc::unbounded::<Result<Frame, String>>();
        let exit = run_session(sink, stream, ClientId::new("X"), ctx).await;

        assert_eq!(exit, PumpExit::Refused);
        assert_eq!(policy.connects.load(Ordering::SeqCst), 0);
    }
}
