//! Connection hub - the single owner of "who is connected".
//!
//! # Architecture
//!
//! ```text
//!  inbound pumps ─┐  register / unregister
//!  policies ──────┼─────────────────────────►  HubCommand channel (bounded, FIFO)
//!  /health ───────┘  broadcast / count                      │
//!                                                           ▼
//!                                             Hub::run (one task, owns Registry)
//!                                                           │ try_enqueue
//!                                    ┌──────────────────────┼──────────────────────┐
//!                                    ▼                      ▼                      ▼
//!                              client queue           client queue           client queue
//!                                    │                      │                      │
//!                              outbound pump          outbound pump          outbound pump
//! ```
//!
//! All registry mutations happen inside [`Hub::run`], one command at a time.
//! Everything else talks to it through a cloneable [`HubHandle`].

mod client;
mod registry;

pub use client::{ClientHandle, OutboundQueue};
pub use registry::{BroadcastReport, Registry};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::relay::{EnqueueError, Message, OutboundFrame};

/// Requests processed by the coordinating loop.
#[derive(Debug)]
pub enum HubCommand {
    /// Replies whether the client was admitted.
    Register(ClientHandle, oneshot::Sender<bool>),
    Unregister(ClientHandle),
    Broadcast(OutboundFrame),
    ClientCount(oneshot::Sender<usize>),
}

/// The hub's coordinating loop stopped accepting requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("hub is not running")]
pub struct HubStopped;

/// Coordinating loop state. Construct with [`Hub::new`], then drive with
/// [`Hub::run`] (or use [`Hub::spawn`]).
pub struct Hub {
    registry: Registry,
    requests: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Default bound on pending hub requests.
    pub const DEFAULT_REQUEST_CAPACITY: usize = 256;

    pub fn new(request_capacity: usize) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(request_capacity.max(1));
        let hub = Self {
            registry: Registry::new(),
            requests: rx,
        };
        (hub, HubHandle { tx })
    }

    /// Starts the coordinating loop on the runtime and returns its handle.
    pub fn spawn(request_capacity: usize) -> HubHandle {
        let (hub, handle) = Self::new(request_capacity);
        tokio::spawn(hub.run());
        handle
    }

    /// Processes requests until every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.requests.recv().await {
            self.handle(command);
        }
        debug!(clients = self.registry.len(), "hub stopped: no handles left");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(client, reply) => {
                let id = client.id().clone();
                let admitted = self.registry.register(client);
                if admitted {
                    info!(client_id = %id, clients = self.registry.len(), "client registered");
                } else {
                    debug!(client_id = %id, "duplicate register ignored");
                }
                let _ = reply.send(admitted);
            }
            HubCommand::Unregister(client) => {
                if self.registry.unregister(&client) {
                    info!(
                        client_id = %client.id(),
                        clients = self.registry.len(),
                        "client unregistered"
                    );
                } else {
                    debug!(client_id = %client.id(), "unregister of absent client ignored");
                }
            }
            HubCommand::Broadcast(frame) => {
                let report = self.registry.broadcast(&frame);
                for id in &report.evicted {
                    warn!(
                        client_id = %id,
                        clients = self.registry.len(),
                        "slow consumer evicted: outbound queue full"
                    );
                }
                debug!(delivered = report.delivered, "broadcast fanned out");
            }
            HubCommand::ClientCount(reply) => {
                let _ = reply.send(self.registry.len());
            }
        }
    }

    /// Pops one pending request without processing it.
    #[cfg(test)]
    pub(crate) fn try_next_command(&mut self) -> Option<HubCommand> {
        self.requests.try_recv().ok()
    }
}

/// Cloneable sender side of the hub's request channel.
#[derive(Clone, Debug)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Returns `Ok(false)` when the registry refused the client, either
    /// because its id is taken or because the handle was already closed.
    pub async fn register(&self, client: ClientHandle) -> Result<bool, HubStopped> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Register(client, reply)).await?;
        response.await.map_err(|_| HubStopped)
    }

    /// Safe to call more than once for the same client.
    pub async fn unregister(&self, client: ClientHandle) -> Result<(), HubStopped> {
        self.send(HubCommand::Unregister(client)).await
    }

    /// Fans `frame` out to every client registered when the hub processes it.
    pub async fn broadcast(&self, frame: OutboundFrame) -> Result<(), HubStopped> {
        self.send(HubCommand::Broadcast(frame)).await
    }

    /// Live connection count as seen by the coordinating loop.
    pub async fn client_count(&self) -> Result<usize, HubStopped> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::ClientCount(reply)).await?;
        response.await.map_err(|_| HubStopped)
    }

    /// Delivers `message` to a single client with a non-blocking enqueue.
    ///
    /// A full queue gets the same treatment as in a broadcast: the client is
    /// unregistered. Returns whether the message was queued.
    pub async fn send_to(&self, client: &ClientHandle, message: &Message) -> bool {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(client_id = %client.id(), error = %e, "failed to encode message");
                return false;
            }
        };

        match client.try_enqueue(frame) {
            Ok(()) => true,
            Err(EnqueueError::Full) => {
                warn!(client_id = %client.id(), "slow consumer evicted: outbound queue full");
                if self.unregister(client.clone()).await.is_err() {
                    client.close();
                }
                false
            }
            Err(EnqueueError::Closed) => {
                debug!(client_id = %client.id(), "dropping message for closed client");
                false
            }
        }
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubStopped> {
        self.tx.send(command).await.map_err(|_| HubStopped)
    }
}
