use axum::extract::ws::Message;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;
use ulid::Ulid;

/// Write capability for one connection: frames sent here are drained by
/// that connection's writer task. The channel closing means the peer is
/// gone (or going) and any further write is a hard failure.
pub type Outbound = mpsc::UnboundedSender<Message>;

/// Opaque, stable identity for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Ulid);

impl ConnId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("connection {0} is not registered")]
    NotRegistered(ConnId),
    #[error("connection {0} is closed")]
    Closed(ConnId),
}

struct Client {
    name: String,
    outbound: Outbound,
}

/// The authoritative live-connection-to-name mapping.
///
/// Every operation takes the one exclusion lock for its full critical
/// section; none of them await while holding it. An entry exists iff
/// its lifecycle handler is between "joined" and "departed".
#[derive(Default)]
pub struct Registry {
    clients: Mutex<HashMap<ConnId, Client>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnId, Client>> {
        self.clients.lock().expect("registry lock poisoned")
    }

    /// Insert an entry and return the new online count.
    pub fn register(&self, id: ConnId, name: &str, outbound: Outbound) -> usize {
        let mut clients = self.lock();
        clients.insert(
            id,
            Client {
                name: name.to_string(),
                outbound,
            },
        );
        clients.len()
    }

    /// Remove an entry if present and return the resulting online
    /// count. Removing an absent entry is a no-op, not an error.
    pub fn unregister(&self, id: ConnId) -> usize {
        let mut clients = self.lock();
        clients.remove(&id);
        clients.len()
    }

    /// Resolve a connection's display name, if it is still registered.
    pub fn lookup(&self, id: ConnId) -> Option<String> {
        self.lock().get(&id).map(|client| client.name.clone())
    }

    /// All current display names, in no particular order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock()
            .values()
            .map(|client| client.name.clone())
            .collect()
    }

    pub fn online_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver `payload` to every registered connection in one locked
    /// pass. A connection whose write fails is closed and removed
    /// before the lock is released. Returns the number of connections
    /// the payload was delivered to.
    pub fn fan_out(&self, payload: &str) -> usize {
        let mut clients = self.lock();
        clients.retain(|id, client| {
            let delivered = client
                .outbound
                .send(Message::Text(payload.to_string().into()))
                .is_ok();
            if !delivered {
                tracing::warn!("write to {} ({}) failed, removing", client.name, id);
            }
            delivered
        });
        clients.len()
    }

    /// Single write attempt to one connection, bypassing the broadcast
    /// queue. The caller decides what a failure means; the registry
    /// entry is left for the connection's own lifecycle handler to
    /// clean up.
    pub fn direct_send(&self, id: ConnId, payload: &str) -> Result<(), DeliveryError> {
        let clients = self.lock();
        let client = clients.get(&id).ok_or(DeliveryError::NotRegistered(id))?;
        client
            .outbound
            .send(Message::Text(payload.to_string().into()))
            .map_err(|_| DeliveryError::Closed(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbound() -> (Outbound, mpsc::UnboundedReceiver<Message>) {
        mpsc::unbounded_channel()
    }

    fn text(msg: Message) -> String {
        match msg {
            Message::Text(text) => text.to_string(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[test]
    fn register_and_unregister_track_count() {
        let registry = Registry::new();
        let (tx_a, _rx_a) = outbound();
        let (tx_b, _rx_b) = outbound();
        let a = ConnId::new();
        let b = ConnId::new();

        assert_eq!(registry.register(a, "alice", tx_a), 1);
        assert_eq!(registry.register(b, "bob", tx_b), 2);
        assert_eq!(registry.online_count(), 2);

        assert_eq!(registry.unregister(a), 1);
        // already absent: no-op
        assert_eq!(registry.unregister(a), 1);
        assert_eq!(registry.unregister(b), 0);
    }

    #[test]
    fn lookup_and_snapshot() {
        let registry = Registry::new();
        let (tx_a, _rx_a) = outbound();
        let (tx_b, _rx_b) = outbound();
        let a = ConnId::new();

        registry.register(a, "alice", tx_a);
        registry.register(ConnId::new(), "bob", tx_b);

        assert_eq!(registry.lookup(a).as_deref(), Some("alice"));
        assert_eq!(registry.lookup(ConnId::new()), None);

        let mut names = registry.snapshot();
        names.sort();
        assert_eq!(names, ["alice", "bob"]);
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let registry = Registry::new();
        let (tx_a, _rx_a) = outbound();
        let (tx_b, _rx_b) = outbound();

        registry.register(ConnId::new(), "alice", tx_a);
        registry.register(ConnId::new(), "alice", tx_b);

        assert_eq!(registry.snapshot(), ["alice", "alice"]);
    }

    #[test]
    fn fan_out_delivers_to_everyone() {
        let registry = Registry::new();
        let (tx_a, mut rx_a) = outbound();
        let (tx_b, mut rx_b) = outbound();

        registry.register(ConnId::new(), "alice", tx_a);
        registry.register(ConnId::new(), "bob", tx_b);

        assert_eq!(registry.fan_out("hello"), 2);
        assert_eq!(text(rx_a.try_recv().unwrap()), "hello");
        assert_eq!(text(rx_b.try_recv().unwrap()), "hello");
    }

    #[test]
    fn fan_out_removes_dead_connections_inline() {
        let registry = Registry::new();
        let (tx_a, mut rx_a) = outbound();
        let (tx_b, rx_b) = outbound();

        registry.register(ConnId::new(), "alice", tx_a);
        let dead = ConnId::new();
        registry.register(dead, "bob", tx_b);
        drop(rx_b);

        assert_eq!(registry.fan_out("hello"), 1);
        assert_eq!(registry.online_count(), 1);
        assert_eq!(registry.lookup(dead), None);
        assert_eq!(text(rx_a.try_recv().unwrap()), "hello");
    }

    #[test]
    fn direct_send_distinguishes_absent_from_closed() {
        let registry = Registry::new();
        let (tx, rx) = outbound();
        let id = ConnId::new();

        assert!(matches!(
            registry.direct_send(id, "hi"),
            Err(DeliveryError::NotRegistered(_))
        ));

        registry.register(id, "alice", tx);
        drop(rx);
        assert!(matches!(
            registry.direct_send(id, "hi"),
            Err(DeliveryError::Closed(_))
        ));
        // a failed direct write does not unregister
        assert_eq!(registry.online_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_registers_leave_a_consistent_count() {
        let registry = std::sync::Arc::new(Registry::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                let id = ConnId::new();
                registry.register(id, &format!("user-{i}"), tx);
                if i % 2 == 0 {
                    registry.unregister(id);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.online_count(), 16);
    }
}
