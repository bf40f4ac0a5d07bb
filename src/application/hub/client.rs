//! Connection handle and its outbound queue.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::domain::relay::{ClientId, EnqueueError, OutboundFrame};

/// Cheap, cloneable reference to one connected client.
///
/// Carries the client's identity and the producing end of its bounded
/// outbound queue. Every enqueue is a non-blocking attempt. The queue can be
/// closed explicitly from any clone; closing is idempotent and permanent.
#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    id: ClientId,
    tx: mpsc::Sender<OutboundFrame>,
    closed: CancellationToken,
}

/// Consuming end of a client's outbound queue, owned by the outbound pump.
pub struct OutboundQueue {
    rx: mpsc::Receiver<OutboundFrame>,
    closed: CancellationToken,
}

impl ClientHandle {
    /// Creates a handle and the queue its outbound pump will drain.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(id: ClientId, capacity: usize) -> (Self, OutboundQueue) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let closed = CancellationToken::new();
        let handle = Self {
            inner: Arc::new(ClientInner {
                id,
                tx,
                closed: closed.clone(),
            }),
        };
        (handle, OutboundQueue { rx, closed })
    }

    pub fn id(&self) -> &ClientId {
        &self.inner.id
    }

    /// Attempts to place `frame` on the queue without waiting.
    pub fn try_enqueue(&self, frame: OutboundFrame) -> Result<(), EnqueueError> {
        if self.is_closed() {
            return Err(EnqueueError::Closed);
        }
        self.inner.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => EnqueueError::Full,
            TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Releases the queue. The outbound pump observes this and shuts down.
    pub fn close(&self) {
        self.inner.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    /// Resolves once the queue has been closed from either end.
    pub async fn closed(&self) {
        self.inner.closed.cancelled().await
    }

    /// True when both handles refer to the same underlying connection.
    pub fn same_connection(&self, other: &ClientHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl OutboundQueue {
    /// Waits for the next frame.
    ///
    /// Returns `None` once the queue is closed. Frames still buffered at that
    /// point are discarded.
    pub async fn next(&mut self) -> Option<OutboundFrame> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => None,
            frame = self.rx.recv() => frame,
        }
    }

    /// Releases the queue from the consuming side, e.g. after a failed write.
    /// Every [`ClientHandle`] for this connection observes it.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> OutboundFrame {
        OutboundFrame::from(text)
    }

    #[tokio::test]
    async fn enqueued_frames_arrive_in_order() {
        let (handle, mut queue) = ClientHandle::new(ClientId::new("a"), 4);
        handle.try_enqueue(frame("one")).unwrap();
        handle.try_enqueue(frame("two")).unwrap();

        assert_eq!(queue.next().await.as_deref(), Some("one"));
        assert_eq!(queue.next().await.as_deref(), Some("two"));
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let (handle, _queue) = ClientHandle::new(ClientId::new("a"), 1);
        assert!(handle.try_enqueue(frame("one")).is_ok());
        assert_eq!(handle.try_enqueue(frame("two")), Err(EnqueueError::Full));
    }

    #[test]
    fn closed_queue_rejects_enqueue() {
        let (handle, _queue) = ClientHandle::new(ClientId::new("a"), 4);
        handle.close();
        assert_eq!(handle.try_enqueue(frame("late")), Err(EnqueueError::Closed));
    }

    #[test]
    fn dropped_consumer_reports_closed() {
        let (handle, queue) = ClientHandle::new(ClientId::new("a"), 4);
        drop(queue);
        assert_eq!(handle.try_enqueue(frame("x")), Err(EnqueueError::Closed));
    }

    #[tokio::test]
    async fn close_wakes_the_consumer_and_is_idempotent() {
        let (handle, mut queue) = ClientHandle::new(ClientId::new("a"), 4);
        handle.try_enqueue(frame("pending")).unwrap();
        handle.close();
        handle.clone().close();

        assert!(queue.is_closed());
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn consumer_side_close_is_seen_by_handles() {
        let (handle, queue) = ClientHandle::new(ClientId::new("a"), 4);
        queue.close();

        handle.closed().await;
        assert!(handle.is_closed());
        assert_eq!(handle.try_enqueue(frame("late")), Err(EnqueueError::Closed));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (handle, _queue) = ClientHandle::new(ClientId::new("a"), 0);
        assert!(handle.try_enqueue(frame("fits")).is_ok());
    }

    #[test]
    fn clones_share_a_connection_but_new_handles_do_not() {
        let (a, _qa) = ClientHandle::new(ClientId::new("same"), 1);
        let (b, _qb) = ClientHandle::new(ClientId::new("same"), 1);
        assert!(a.same_connection(&a.clone()));
        assert!(!a.same_connection(&b));
    }
}
