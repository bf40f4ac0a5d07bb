//! Write side of a connection.

use std::fmt::Display;
use std::time::Duration;

use futures::{Sink, SinkExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::application::hub::OutboundQueue;
use crate::domain::relay::{ClientId, ConnectionError, Frame, HeartbeatConfig};

use super::PumpExit;

/// Drains `queue` into `sink`, interleaving heartbeat pings.
///
/// Every write, pings included, must finish within `heartbeat.write_wait`.
/// Any write failure ends the pump and releases the queue, which stops the
/// paired inbound pump. When the hub closes the queue a close frame is sent
/// first. The sink is closed on every exit path. This pump never talks to the
/// hub.
pub async fn run_outbound_pump<S>(
    mut sink: S,
    mut queue: OutboundQueue,
    heartbeat: HeartbeatConfig,
    client_id: ClientId,
) -> PumpExit
where
    S: Sink<Frame> + Unpin,
    S::Error: Display,
{
    let mut ticker = time::interval_at(Instant::now() + heartbeat.ping_period, heartbeat.ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            next = queue.next() => match next {
                Some(frame) => {
                    let text = Frame::Text(frame.to_string());
                    if let Err(e) = write_frame(&mut sink, text, heartbeat.write_wait).await {
                        break PumpExit::Failed(e);
                    }
                }
                None => {
                    let close = Frame::Close { code: Some(Frame::CLOSE_NORMAL) };
                    // The peer may already be gone; the close is best effort.
                    let _ = write_frame(&mut sink, close, heartbeat.write_wait).await;
                    break PumpExit::QueueClosed;
                }
            },
            _ = ticker.tick() => {
                if let Err(e) = write_frame(&mut sink, Frame::Ping(Vec::new()), heartbeat.write_wait).await {
                    break PumpExit::Failed(e);
                }
            }
        }
    };

    if matches!(exit, PumpExit::Failed(_)) {
        queue.close();
    }
    let _ = time::timeout(heartbeat.write_wait, sink.close()).await;
    debug!(client_id = %client_id, exit = ?exit, "outbound pump stopped");
    exit
}

async fn write_frame<S>(sink: &mut S, frame: Frame, deadline: Duration) -> Result<(), ConnectionError>
where
    S: Sink<Frame> + Unpin,
    S::Error: Display,
{
    match time::timeout(deadline, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConnectionError::transport(e)),
        Err(_) => Err(ConnectionError::WriteTimeout),
    }
}
