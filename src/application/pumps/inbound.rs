//! Read side of a connection.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::application::hub::{ClientHandle, HubHandle};
use crate::domain::relay::{ConnectionError, Frame, HeartbeatConfig, Message};
use crate::ports::RoutingPolicy;

use super::PumpExit;

/// Reads frames from `stream` until it fails, closes, misses a heartbeat, or
/// the client's queue is released (hub eviction or a dead write half).
///
/// The read deadline starts at `heartbeat.pong_wait` and is pushed back only
/// by pong frames. Frames over `heartbeat.max_message_size` are fatal. Text
/// and binary frames are decoded with [`Message::from_wire`] and passed to
/// `policy`.
///
/// On exit, whatever the cause: the client is unregistered from the hub, the
/// stream is dropped, and `policy.on_disconnect` runs. Each happens once.
pub async fn run_inbound_pump<St, E>(
    mut stream: St,
    client: ClientHandle,
    hub: HubHandle,
    policy: Arc<dyn RoutingPolicy>,
    heartbeat: HeartbeatConfig,
) -> PumpExit
where
    St: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    let exit = read_loop(&mut stream, &client, policy.as_ref(), &heartbeat).await;

    match &exit {
        PumpExit::Failed(ConnectionError::FrameTooLarge { size, limit }) => {
            warn!(client_id = %client.id(), size, limit, "inbound frame too large");
        }
        other => debug!(client_id = %client.id(), exit = ?other, "inbound pump stopped"),
    }

    if hub.unregister(client.clone()).await.is_err() {
        client.close();
    }
    drop(stream);
    policy.on_disconnect(&client).await;

    exit
}

async fn read_loop<St, E>(
    stream: &mut St,
    client: &ClientHandle,
    policy: &dyn RoutingPolicy,
    heartbeat: &HeartbeatConfig,
) -> PumpExit
where
    St: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    let mut deadline = Instant::now() + heartbeat.pong_wait;

    loop {
        let next = tokio::select! {
            biased;
            _ = client.closed() => return PumpExit::QueueClosed,
            next = time::timeout_at(deadline, stream.next()) => next,
        };
        let frame = match next {
            Err(_) => return PumpExit::Failed(ConnectionError::ReadTimeout),
            Ok(None) => return PumpExit::PeerClosed,
            Ok(Some(Err(e))) => return PumpExit::Failed(ConnectionError::transport(e)),
            Ok(Some(Ok(frame))) => frame,
        };

        let size = frame.payload_len();
        if size > heartbeat.max_message_size {
            return PumpExit::Failed(ConnectionError::FrameTooLarge {
                size,
                limit: heartbeat.max_message_size,
            });
        }

        match frame {
            Frame::Text(text) => {
                let message = Message::from_wire(&text, client.id());
                policy.on_message(client, message).await;
            }
            Frame::Binary(data) => {
                let message = Message::from_wire(&String::from_utf8_lossy(&data), client.id());
                policy.on_message(client, message).await;
            }
            Frame::Pong(_) => deadline = Instant::now() + heartbeat.pong_wait,
            // The transport answers pings itself.
            Frame::Ping(_) => {}
            Frame::Close { code } => {
                if !Frame::is_expected_close(code) {
                    warn!(client_id = %client.id(), code = ?code, "unexpected close");
                }
                return PumpExit::PeerClosed;
            }
        }
    }
}
