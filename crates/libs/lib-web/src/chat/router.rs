//! # Message Router
//!
//! Decides the delivery fan-out for each inbound message and persists it
//! durably *before* any delivery is attempted.
//!
//! The ordering matters: persist-then-deliver means a crash between the two
//! steps can never leave a recipient having seen a message that history will
//! not show. Delivery itself is best effort — attempted once, against the
//! presence snapshot at routing time, with no acknowledgement and no retry.

use super::presence::PresenceRegistry;
use super::session::ConnectionSession;
use lib_core::dto::{MessageIn, ServerEvent};
use lib_core::model::store::models::{ChatMessage, MessageForCreate};
use lib_core::model::store::MessageRepository;
use lib_core::DbPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors local to a single `route` call.
///
/// Neither variant is allowed to terminate the connection loop: one failed
/// message must not affect subsequent events on the same or other
/// connections. An offline recipient is *not* represented here — absence from
/// the registry is a normal, silent best-effort outcome.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Missing or inconsistent fields; the message is dropped with no
    /// persistence and no delivery.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The persistence backend failed; the whole route operation is aborted
    /// so no unsaved message is ever fanned out.
    #[error("message store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Routes inbound messages: validate, persist, fan out.
pub struct MessageRouter {
    pool: DbPool,
    presence: Arc<PresenceRegistry>,
}

impl MessageRouter {
    pub fn new(pool: DbPool, presence: Arc<PresenceRegistry>) -> Self {
        Self { pool, presence }
    }

    /// Validate, persist, and deliver one message.
    ///
    /// Fan-out rules:
    /// - `to == "public"`: delivered exactly once to every attached
    ///   connection; the sender receives it through that same broadcast pass,
    ///   never as an extra duplicate.
    /// - targeted: the recipient's connection (if registered) and the
    ///   sender's own connection (if registered) are delivered to
    ///   independently. Neither online still persists the message; it stays
    ///   retrievable via history.
    ///
    /// Returns the persisted message with its id and server-assigned
    /// timestamp.
    pub async fn route(
        &self,
        session: &ConnectionSession,
        incoming: MessageIn,
    ) -> Result<ChatMessage, RouteError> {
        self.validate(session, &incoming)?;

        // Persist first; a store failure aborts the route with no partial
        // fan-out.
        let stored = MessageRepository::create(
            &self.pool,
            MessageForCreate {
                sender_id: incoming.sender_id,
                sender_name: incoming.sender_name,
                recipient: incoming.to,
                text: incoming.text,
                image: incoming.image,
            },
        )
        .await
        .map_err(|e| RouteError::StoreUnavailable(e.to_string()))?;

        if stored.is_public() {
            let reached = self
                .presence
                .broadcast(ServerEvent::NewMessage(stored.clone()))
                .await;
            debug!(
                message_id = stored.id,
                reached,
                "[ROUTE] broadcast message {} to {} connection(s)",
                stored.id,
                reached
            );
        } else {
            // Recipient delivery and sender echo are independent; either may
            // be offline without affecting the other.
            let mut reached = 0usize;

            if let Some(conn_id) = self.presence.lookup(&stored.recipient).await {
                if self
                    .presence
                    .send_to(conn_id, ServerEvent::NewMessage(stored.clone()))
                    .await
                {
                    reached += 1;
                }
            }

            if let Some(conn_id) = self.presence.lookup(&stored.sender_id).await {
                if self
                    .presence
                    .send_to(conn_id, ServerEvent::NewMessage(stored.clone()))
                    .await
                {
                    reached += 1;
                }
            }

            if reached == 0 {
                warn!(
                    message_id = stored.id,
                    recipient = %stored.recipient,
                    "[ROUTE] message {} persisted, nobody online to deliver to",
                    stored.id
                );
            } else {
                debug!(
                    message_id = stored.id,
                    reached,
                    "[ROUTE] targeted message {} delivered to {} connection(s)",
                    stored.id,
                    reached
                );
            }
        }

        Ok(stored)
    }

    /// Minimal by intent: only the fields routing itself depends on are
    /// checked. Text and image content passes through untouched, including
    /// messages carrying neither.
    fn validate(&self, session: &ConnectionSession, msg: &MessageIn) -> Result<(), RouteError> {
        if msg.sender_id.trim().is_empty() {
            return Err(RouteError::MalformedMessage("senderId is required".into()));
        }
        if msg.to.trim().is_empty() {
            return Err(RouteError::MalformedMessage("to is required".into()));
        }

        // Provenance check: once a connection has joined as some identity,
        // its messages must claim that identity.
        if let Some(bound) = session.identity() {
            if bound != msg.sender_id {
                return Err(RouteError::MalformedMessage(format!(
                    "senderId {} does not match bound identity {}",
                    msg.sender_id, bound
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::dto::ServerEvent;
    use sqlx::sqlite::SqlitePoolOptions;
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use uuid::Uuid;

    async fn setup_pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id TEXT NOT NULL,
                sender_name TEXT NOT NULL,
                recipient TEXT NOT NULL,
                text TEXT,
                image TEXT,
                timestamp TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create messages table");

        pool
    }

    struct Peer {
        session: ConnectionSession,
        rx: UnboundedReceiver<ServerEvent>,
    }

    impl Peer {
        /// One attached connection, joined as `user_id`.
        async fn join(registry: &PresenceRegistry, user_id: &str) -> Self {
            let id = Uuid::new_v4();
            let (tx, rx) = mpsc::unbounded_channel();
            registry.attach(id, tx).await;
            let mut session = ConnectionSession::new(id);
            session.bind(registry, user_id.to_string()).await;
            Self { session, rx }
        }

        fn next_message(&mut self) -> Option<ChatMessage> {
            match self.rx.try_recv() {
                Ok(ServerEvent::NewMessage(msg)) => Some(msg),
                Err(_) => None,
            }
        }
    }

    fn text_in(sender: &str, to: &str, text: &str) -> MessageIn {
        MessageIn {
            sender_id: sender.to_string(),
            sender_name: sender.to_string(),
            to: to.to_string(),
            text: Some(text.to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_public_broadcast_reaches_everyone_exactly_once() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool, Arc::clone(&registry));

        let mut alice = Peer::join(&registry, "alice").await;
        let mut bob = Peer::join(&registry, "bob").await;

        let stored = router
            .route(&alice.session, text_in("alice", "public", "hi"))
            .await
            .unwrap();

        assert!(stored.is_public());

        // Both receive the message once; the sender gets it via the
        // broadcast itself, not as a second echo.
        let got_alice = alice.next_message().expect("sender receives broadcast");
        let got_bob = bob.next_message().expect("peer receives broadcast");
        assert_eq!(got_alice.text.as_deref(), Some("hi"));
        assert_eq!(got_bob, got_alice);
        assert!(alice.next_message().is_none());
        assert!(bob.next_message().is_none());
    }

    #[tokio::test]
    async fn test_private_message_delivered_to_both_ends() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool, Arc::clone(&registry));

        let mut alice = Peer::join(&registry, "alice").await;
        let mut bob = Peer::join(&registry, "bob").await;
        let mut carol = Peer::join(&registry, "carol").await;

        router
            .route(&alice.session, text_in("alice", "bob", "hey"))
            .await
            .unwrap();

        assert!(alice.next_message().is_some(), "sender echo");
        assert!(bob.next_message().is_some(), "recipient delivery");
        assert!(carol.next_message().is_none(), "third parties see nothing");
    }

    #[tokio::test]
    async fn test_offline_recipient_still_gets_echo_and_history() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool.clone(), Arc::clone(&registry));

        let mut alice = Peer::join(&registry, "alice").await;
        // bob never joins

        router
            .route(&alice.session, text_in("alice", "bob", "hey"))
            .await
            .unwrap();

        let echo = alice.next_message().expect("sender echo despite offline recipient");
        assert_eq!(echo.text.as_deref(), Some("hey"));

        let history = MessageRepository::private_history(&pool, "alice", "bob", 100)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text.as_deref(), Some("hey"));
    }

    #[tokio::test]
    async fn test_nobody_online_still_persists() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool.clone(), Arc::clone(&registry));

        // Unbound session sending on behalf of an offline pair
        let session = ConnectionSession::new(Uuid::new_v4());

        let stored = router
            .route(&session, text_in("alice", "bob", "into the void"))
            .await
            .unwrap();
        assert!(stored.id > 0);

        let history = MessageRepository::private_history(&pool, "bob", "alice", 100)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_message_is_not_persisted() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool.clone(), Arc::clone(&registry));
        let session = ConnectionSession::new(Uuid::new_v4());

        let cases = [text_in("", "public", "hi"), text_in("alice", "", "hi")];

        for incoming in cases {
            let result = router.route(&session, incoming).await;
            assert!(matches!(result, Err(RouteError::MalformedMessage(_))));
        }

        let history = MessageRepository::public_history(&pool, 100).await.unwrap();
        assert!(history.is_empty(), "nothing persisted for malformed input");
    }

    #[tokio::test]
    async fn test_message_without_text_or_image_is_routed() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool.clone(), Arc::clone(&registry));

        let mut alice = Peer::join(&registry, "alice").await;
        let mut bob = Peer::join(&registry, "bob").await;

        // Content is free-form; a message carrying neither text nor image is
        // still persisted and fanned out.
        let stored = router
            .route(
                &alice.session,
                MessageIn {
                    sender_id: "alice".to_string(),
                    sender_name: "Alice".to_string(),
                    to: "public".to_string(),
                    text: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        assert!(stored.text.is_none());
        assert!(stored.image.is_none());
        assert!(alice.next_message().is_some());
        assert!(bob.next_message().is_some());

        let history = MessageRepository::public_history(&pool, 100).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_sender_mismatch_against_bound_identity() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool.clone(), Arc::clone(&registry));

        let alice = Peer::join(&registry, "alice").await;

        let result = router
            .route(&alice.session, text_in("mallory", "public", "spoofed"))
            .await;

        assert!(matches!(result, Err(RouteError::MalformedMessage(_))));
        let history = MessageRepository::public_history(&pool, 100).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_unbound_sender_is_routed_from_payload_identity() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool, Arc::clone(&registry));

        let mut bob = Peer::join(&registry, "bob").await;

        // A connection that never joined can still send; identity comes from
        // the payload.
        let session = ConnectionSession::new(Uuid::new_v4());
        router
            .route(&session, text_in("alice", "bob", "hello from nowhere"))
            .await
            .unwrap();

        assert!(bob.next_message().is_some());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_delivery() {
        let pool = setup_pool().await;
        let registry = Arc::new(PresenceRegistry::new());
        let router = MessageRouter::new(pool.clone(), Arc::clone(&registry));

        let mut alice = Peer::join(&registry, "alice").await;
        let mut bob = Peer::join(&registry, "bob").await;

        // Simulate the backend going away
        pool.close().await;

        let result = router
            .route(&alice.session, text_in("alice", "public", "lost"))
            .await;

        assert!(matches!(result, Err(RouteError::StoreUnavailable(_))));
        assert!(alice.next_message().is_none(), "no partial fan-out");
        assert!(bob.next_message().is_none());
    }
}
