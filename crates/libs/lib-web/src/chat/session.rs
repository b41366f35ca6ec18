//! # Connection Session
//!
//! Per-connection state machine binding a raw channel to a logical user
//! identity after the `join` handshake.
//!
//! Two states: **Unbound** (initial) and **Bound** (after `join`). A
//! `send_message` while Unbound is still routed — identity then comes from
//! the payload — but the router refuses a payload sender that contradicts a
//! bound identity.

use super::presence::{ConnectionId, PresenceRegistry};
use tracing::info;

/// State a single connection carries between events.
///
/// The session, not the transport, remembers which identity the connection
/// registered; disconnect could not target the right registry entry
/// otherwise.
#[derive(Debug)]
pub struct ConnectionSession {
    id: ConnectionId,
    identity: Option<String>,
}

impl ConnectionSession {
    pub fn new(id: ConnectionId) -> Self {
        Self { id, identity: None }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The identity this connection last registered, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Handle a `join` event: register under `user_id` and remember it.
    ///
    /// On a repeated join with a different identity, the previous identity is
    /// unregistered first (if this connection still owns its entry) so the
    /// rebind leaves no stale presence entry behind.
    pub async fn bind(&mut self, registry: &PresenceRegistry, user_id: String) {
        if let Some(previous) = self.identity.take() {
            if previous != user_id {
                registry.unregister_if_current(&previous, self.id).await;
                info!(
                    conn_id = %self.id,
                    "[SESSION] rebind {} -> {} on connection {}",
                    previous, user_id, self.id
                );
            }
        }

        registry.register(&user_id, self.id).await;
        self.identity = Some(user_id);
    }

    /// Handle the connection's disconnect: unregister the stored identity
    /// (only if its registry entry still points at this connection) and stop
    /// participating in broadcasts. No-op on the presence map if never bound.
    pub async fn close(&mut self, registry: &PresenceRegistry) {
        if let Some(identity) = self.identity.take() {
            registry.unregister_if_current(&identity, self.id).await;
        }
        registry.detach(self.id).await;
    }
}
