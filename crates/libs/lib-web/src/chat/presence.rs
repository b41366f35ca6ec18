//! # Presence Registry
//!
//! In-memory mapping from logical user identity to the currently active
//! connection, plus the outbound channel of every attached connection.
//!
//! One entry per user identity, last join wins. The registry lives for the
//! process lifetime, is never persisted, and is rebuilt from zero on restart;
//! clients re-issue `join` after reconnecting.
//!
//! Both maps sit behind a single `RwLock` so that register/unregister/lookup
//! interleavings on the same key are linearizable. All mutation goes through
//! the methods here; nothing else touches the maps.

use lib_core::dto::ServerEvent;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Identifier of one live connection.
pub type ConnectionId = Uuid;

/// Outbound event channel of a connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

#[derive(Default)]
struct RegistryInner {
    /// userId -> connection currently bound to it (last join wins)
    users: HashMap<String, ConnectionId>,
    /// every attached connection, bound or not
    connections: HashMap<ConnectionId, EventSender>,
}

/// Process-wide presence state, shared by the router and all sessions.
#[derive(Default)]
pub struct PresenceRegistry {
    inner: RwLock<RegistryInner>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly opened connection's outbound channel.
    ///
    /// The connection participates in broadcasts from this point on, even
    /// before it has joined under an identity.
    pub async fn attach(&self, conn_id: ConnectionId, sender: EventSender) {
        let mut inner = self.inner.write().await;
        inner.connections.insert(conn_id, sender);
    }

    /// Forget a closed connection's outbound channel.
    pub async fn detach(&self, conn_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        inner.connections.remove(&conn_id);
    }

    /// Bind `user_id` to `conn_id`, unconditionally overwriting any existing
    /// entry for that identity. Total function, no error conditions.
    pub async fn register(&self, user_id: &str, conn_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        let previous = inner.users.insert(user_id.to_string(), conn_id);
        if let Some(prev) = previous {
            if prev != conn_id {
                debug!(
                    user_id = %user_id,
                    "[PRESENCE] re-register: {} moved from {} to {}",
                    user_id, prev, conn_id
                );
            }
        }
    }

    /// Pure read. `None` means "no known live connection" and the caller must
    /// treat it as "cannot deliver live", never as an error.
    pub async fn lookup(&self, user_id: &str) -> Option<ConnectionId> {
        let inner = self.inner.read().await;
        inner.users.get(user_id).copied()
    }

    /// Remove the entry for `user_id` only if it still points at `conn_id`.
    ///
    /// A stale disconnect (old connection of a user who has since rejoined
    /// elsewhere) must not clear the newer connection's entry.
    pub async fn unregister_if_current(&self, user_id: &str, conn_id: ConnectionId) -> bool {
        let mut inner = self.inner.write().await;
        match inner.users.get(user_id) {
            Some(current) if *current == conn_id => {
                inner.users.remove(user_id);
                true
            }
            _ => false,
        }
    }

    /// Best-effort single delivery. Returns `false` if the connection is gone
    /// or its channel is closed; the event is silently dropped in that case.
    pub async fn send_to(&self, conn_id: ConnectionId, event: ServerEvent) -> bool {
        let inner = self.inner.read().await;
        match inner.connections.get(&conn_id) {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver `event` exactly once to every attached connection, including
    /// the sender's own. Returns the number of channels the event reached.
    pub async fn broadcast(&self, event: ServerEvent) -> usize {
        let inner = self.inner.read().await;
        inner
            .connections
            .values()
            .filter(|sender| sender.send(event.clone()).is_ok())
            .count()
    }

    /// Number of currently attached connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::model::store::models::ChatMessage;
    use lib_utils::time::now_utc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn test_event(text: &str) -> ServerEvent {
        ServerEvent::NewMessage(ChatMessage {
            id: 1,
            sender_id: "alice".to_string(),
            sender_name: "Alice".to_string(),
            recipient: "public".to_string(),
            text: Some(text.to_string()),
            image: None,
            timestamp: now_utc(),
        })
    }

    async fn attach_new(registry: &PresenceRegistry) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.attach(conn_id, tx).await;
        (conn_id, rx)
    }

    #[tokio::test]
    async fn test_register_last_join_wins() {
        let registry = PresenceRegistry::new();
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();

        registry.register("alice", c1).await;
        registry.register("alice", c2).await;

        assert_eq!(registry.lookup("alice").await, Some(c2));
    }

    #[tokio::test]
    async fn test_lookup_absent_is_none() {
        let registry = PresenceRegistry::new();
        assert_eq!(registry.lookup("ghost").await, None);
    }

    #[tokio::test]
    async fn test_stale_unregister_does_not_clobber_newer_entry() {
        let registry = PresenceRegistry::new();
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();

        // alice joins on c1, then rejoins on c2; c1's late disconnect must
        // leave c2's entry intact.
        registry.register("alice", c1).await;
        registry.register("alice", c2).await;

        assert!(!registry.unregister_if_current("alice", c1).await);
        assert_eq!(registry.lookup("alice").await, Some(c2));
    }

    #[tokio::test]
    async fn test_current_unregister_removes_entry() {
        let registry = PresenceRegistry::new();
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();

        // The other ordering: c1 disconnects while still current, then the
        // user rejoins on c2.
        registry.register("alice", c1).await;
        assert!(registry.unregister_if_current("alice", c1).await);
        assert_eq!(registry.lookup("alice").await, None);

        registry.register("alice", c2).await;
        assert_eq!(registry.lookup("alice").await, Some(c2));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection_once() {
        let registry = PresenceRegistry::new();
        let (_c1, mut rx1) = attach_new(&registry).await;
        let (_c2, mut rx2) = attach_new(&registry).await;
        let (_c3, mut rx3) = attach_new(&registry).await;

        let reached = registry.broadcast(test_event("hi")).await;
        assert_eq!(reached, 3);

        for rx in [&mut rx1, &mut rx2, &mut rx3] {
            rx.try_recv().expect("each connection receives the event");
            assert!(rx.try_recv().is_err(), "exactly once per connection");
        }
    }

    #[tokio::test]
    async fn test_send_to_detached_connection_is_dropped() {
        let registry = PresenceRegistry::new();
        let (conn_id, mut rx) = attach_new(&registry).await;

        registry.detach(conn_id).await;

        assert!(!registry.send_to(conn_id, test_event("late")).await);
        assert!(rx.try_recv().is_err());
    }
}
