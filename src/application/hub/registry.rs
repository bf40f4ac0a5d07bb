//! Membership map owned by the hub's coordinating loop.
//!
//! `Registry` is plain single-threaded state. It is only ever mutated from
//! [`super::Hub::run`], which gives the serialization guarantee without locks.

use std::collections::HashMap;

use crate::domain::relay::{ClientId, EnqueueError, OutboundFrame};

use super::ClientHandle;

/// Result of fanning one frame out to every registered client.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients whose queue accepted the frame.
    pub delivered: usize,

    /// Clients removed because their queue was full or already closed.
    pub evicted: Vec<ClientId>,
}

/// The set of live connections, keyed by client id.
#[derive(Default)]
pub struct Registry {
    clients: HashMap<ClientId, ClientHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle`. Returns `false` (and changes nothing) if its id is
    /// already registered or the handle has already been released.
    pub fn register(&mut self, handle: ClientHandle) -> bool {
        if handle.is_closed() || self.clients.contains_key(handle.id()) {
            return false;
        }
        self.clients.insert(handle.id().clone(), handle);
        true
    }

    /// Removes `handle` if it is the registered connection for its id.
    ///
    /// The handle's queue is closed either way, so repeated or late calls
    /// are harmless. Returns whether an entry was removed.
    pub fn unregister(&mut self, handle: &ClientHandle) -> bool {
        handle.close();
        match self.clients.get(handle.id()) {
            Some(current) if current.same_connection(handle) => {
                self.clients.remove(handle.id());
                true
            }
            _ => false,
        }
    }

    /// Attempts a non-blocking enqueue of `frame` for every client.
    ///
    /// A client whose queue is full is treated as dead: it is removed and its
    /// queue closed. Nobody waits on a slow consumer.
    pub fn broadcast(&mut self, frame: &OutboundFrame) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (id, client) in &self.clients {
            match client.try_enqueue(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(EnqueueError::Full) | Err(EnqueueError::Closed) => {
                    report.evicted.push(id.clone());
                }
            }
        }

        for id in &report.evicted {
            if let Some(client) = self.clients.remove(id) {
                client.close();
            }
        }

        report
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hub::OutboundQueue;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn client(id: &str, capacity: usize) -> (ClientHandle, OutboundQueue) {
        ClientHandle::new(ClientId::new(id), capacity)
    }

    fn frame() -> OutboundFrame {
        OutboundFrame::from(r#"{"type":"message","payload":"hi"}"#)
    }

    #[test]
    fn register_adds_client() {
        let mut registry = Registry::new();
        let (a, _qa) = client("a", 4);

        assert!(registry.register(a));
        assert!(registry.contains(&ClientId::new("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_register_is_a_no_op() {
        let mut registry = Registry::new();
        let (a, _qa) = client("a", 4);
        let (impostor, _qi) = client("a", 4);

        assert!(registry.register(a.clone()));
        assert!(!registry.register(a));
        assert!(!registry.register(impostor));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn released_handle_is_never_resurrected() {
        let mut registry = Registry::new();
        let (a, _qa) = client("a", 4);
        registry.register(a.clone());
        registry.unregister(&a);

        assert!(!registry.register(a));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_removes_and_closes_queue() {
        let mut registry = Registry::new();
        let (a, queue) = client("a", 4);
        registry.register(a.clone());

        assert!(registry.unregister(&a));
        assert!(registry.is_empty());
        assert!(queue.is_closed());
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut registry = Registry::new();
        let (a, _qa) = client("a", 4);
        registry.register(a.clone());

        assert!(registry.unregister(&a));
        assert!(!registry.unregister(&a));
        assert!(registry.is_empty());
    }

    #[test]
    fn stale_handle_does_not_remove_newer_connection_with_same_id() {
        let mut registry = Registry::new();
        let (old, _qo) = client("10.0.0.1:5000", 4);
        let (new, new_queue) = client("10.0.0.1:5000", 4);

        registry.register(old.clone());
        registry.unregister(&old);
        registry.register(new);

        assert!(!registry.unregister(&old));
        assert!(registry.contains(&ClientId::new("10.0.0.1:5000")));
        assert!(!new_queue.is_closed());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_client_without_mutation() {
        let mut registry = Registry::new();
        let mut queues = Vec::new();
        for id in ["a", "b", "c"] {
            let (handle, queue) = client(id, 4);
            registry.register(handle);
            queues.push(queue);
        }

        let report = registry.broadcast(&frame());

        assert_eq!(report.delivered, 3);
        assert!(report.evicted.is_empty());
        assert_eq!(registry.len(), 3);
        for queue in &mut queues {
            assert_eq!(queue.next().await, Some(frame()));
        }
    }

    #[tokio::test]
    async fn broadcast_evicts_only_the_full_client() {
        let mut registry = Registry::new();
        let (slow, slow_queue) = client("slow", 1);
        slow.try_enqueue(OutboundFrame::from("backlog")).unwrap();
        registry.register(slow);

        let (fast_a, mut qa) = client("fast-a", 4);
        let (fast_b, mut qb) = client("fast-b", 4);
        registry.register(fast_a);
        registry.register(fast_b);

        let report = registry.broadcast(&frame());

        assert_eq!(report.delivered, 2);
        assert_eq!(report.evicted, vec![ClientId::new("slow")]);
        assert!(!registry.contains(&ClientId::new("slow")));
        assert!(slow_queue.is_closed());
        assert_eq!(qa.next().await, Some(frame()));
        assert_eq!(qb.next().await, Some(frame()));
    }

    #[test]
    fn broadcast_evicts_clients_whose_pump_is_gone() {
        let mut registry = Registry::new();
        let (gone, queue) = client("gone", 4);
        registry.register(gone);
        drop(queue);

        let report = registry.broadcast(&frame());

        assert_eq!(report.delivered, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn broadcast_to_empty_registry_is_noop() {
        let mut registry = Registry::new();
        assert_eq!(registry.broadcast(&frame()), BroadcastReport::default());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register(usize),
        Unregister(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..8).prop_map(Op::Register),
            (0usize..8).prop_map(Op::Unregister),
        ]
    }

    proptest! {
        #[test]
        fn membership_is_registered_minus_unregistered(ops in prop::collection::vec(op(), 0..64)) {
            let handles: Vec<(ClientHandle, OutboundQueue)> =
                (0..8).map(|i| client(&format!("client-{i}"), 4)).collect();
            let mut registry = Registry::new();
            let mut expected: HashSet<usize> = HashSet::new();

            for op in &ops {
                match op {
                    Op::Register(i) => {
                        // A handle is never resurrected after its first unregister.
                        if !handles[*i].0.is_closed() {
                            registry.register(handles[*i].0.clone());
                            expected.insert(*i);
                        }
                    }
                    Op::Unregister(i) => {
                        registry.unregister(&handles[*i].0);
                        expected.remove(i);
                    }
                }
            }

            prop_assert_eq!(registry.len(), expected.len());
            for (i, (handle, _)) in handles.iter().enumerate() {
                prop_assert_eq!(registry.contains(handle.id()), expected.contains(&i));
            }
        }
    }
}
