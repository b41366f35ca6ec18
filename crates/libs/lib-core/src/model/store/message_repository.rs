//! # Message Repository
//!
//! Durable, append-only persistence for chat messages with time-ordered
//! retrieval. This is the store the router writes through before any
//! delivery is attempted.
//!
//! History queries return messages in ascending timestamp order; rows with
//! colliding timestamps fall back to insertion order (`id`) as a tiebreak.

use super::models::{ChatMessage, MessageForCreate, PUBLIC_RECIPIENT};
use super::DbPool;
use lib_utils::time::now_utc;
use sqlx::query_as;

/// Message repository for database operations.
///
/// Messages are write-once: there is deliberately no update or single-row
/// delete here. `delete_all` exists only for the maintenance tooling.
pub struct MessageRepository;

impl MessageRepository {
    /// Persist a new message, assigning the server-side timestamp.
    ///
    /// Returns the stored row (with generated id and timestamp). The caller
    /// must not attempt delivery unless this has succeeded.
    pub async fn create(
        pool: &DbPool,
        message: MessageForCreate,
    ) -> Result<ChatMessage, sqlx::Error> {
        let timestamp = now_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_id, sender_name, recipient, text, image, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.recipient)
        .bind(&message.text)
        .bind(&message.image)
        .bind(timestamp)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, ChatMessage>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// All public (broadcast) messages, ascending by timestamp, capped at `limit`.
    pub async fn public_history(
        pool: &DbPool,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM messages
            WHERE recipient = ?
            ORDER BY timestamp ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(PUBLIC_RECIPIENT)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Private conversation history between two identities.
    ///
    /// Returns the union of both directions — `(requester -> target)` and
    /// `(target -> requester)` — ascending by timestamp. Messages involving
    /// any third party never match.
    pub async fn private_history(
        pool: &DbPool,
        requester: &str,
        target: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = ? AND recipient = ?)
               OR (sender_id = ? AND recipient = ?)
            ORDER BY timestamp ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(requester)
        .bind(target)
        .bind(target)
        .bind(requester)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Delete all messages from the database.
    ///
    /// **WARNING**: destructive, used only by the clear-messages utility.
    pub async fn delete_all(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages").execute(pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Create an in-memory SQLite database for testing
    async fn setup_test_db() -> DbPool {
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

    fn text_message(sender: &str, recipient: &str, text: &str) -> MessageForCreate {
        MessageForCreate {
            sender_id: sender.to_string(),
            sender_name: sender.to_string(),
            recipient: recipient.to_string(),
            text: Some(text.to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let pool = setup_test_db().await;

        let before = now_utc();
        let stored = MessageRepository::create(&pool, text_message("alice", "public", "hi"))
            .await
            .unwrap();
        let after = now_utc();

        assert!(stored.id > 0);
        assert_eq!(stored.sender_id, "alice");
        assert_eq!(stored.recipient, "public");
        assert_eq!(stored.text.as_deref(), Some("hi"));
        assert!(stored.timestamp >= before && stored.timestamp <= after);
    }

    #[tokio::test]
    async fn test_public_history_excludes_private() {
        let pool = setup_test_db().await;

        MessageRepository::create(&pool, text_message("alice", "public", "one"))
            .await
            .unwrap();
        MessageRepository::create(&pool, text_message("alice", "bob", "private"))
            .await
            .unwrap();
        MessageRepository::create(&pool, text_message("bob", "public", "two"))
            .await
            .unwrap();

        let history = MessageRepository::public_history(&pool, 100).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text.as_deref(), Some("one"));
        assert_eq!(history[1].text.as_deref(), Some("two"));
        assert!(history.iter().all(|m| m.is_public()));
    }

    #[tokio::test]
    async fn test_public_history_ascending_with_id_tiebreak() {
        let pool = setup_test_db().await;

        // Inserted back to back; colliding timestamps must come back in
        // insertion order.
        for i in 0..5 {
            MessageRepository::create(&pool, text_message("alice", "public", &format!("m{}", i)))
                .await
                .unwrap();
        }

        let history = MessageRepository::public_history(&pool, 100).await.unwrap();

        assert_eq!(history.len(), 5);
        for window in history.windows(2) {
            assert!(window[0].timestamp <= window[1].timestamp);
            assert!(window[0].id < window[1].id);
        }
    }

    #[tokio::test]
    async fn test_private_history_union_of_both_directions() {
        let pool = setup_test_db().await;

        MessageRepository::create(&pool, text_message("alice", "bob", "hey bob"))
            .await
            .unwrap();
        MessageRepository::create(&pool, text_message("bob", "alice", "hey alice"))
            .await
            .unwrap();
        // Third parties must never leak into the pair's history
        MessageRepository::create(&pool, text_message("carol", "bob", "intruder"))
            .await
            .unwrap();
        MessageRepository::create(&pool, text_message("alice", "carol", "other chat"))
            .await
            .unwrap();

        let history = MessageRepository::private_history(&pool, "alice", "bob", 100)
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text.as_deref(), Some("hey bob"));
        assert_eq!(history[1].text.as_deref(), Some("hey alice"));

        // Symmetric from bob's side
        let mirrored = MessageRepository::private_history(&pool, "bob", "alice", 100)
            .await
            .unwrap();
        assert_eq!(history, mirrored);
    }

    #[tokio::test]
    async fn test_history_respects_limit() {
        let pool = setup_test_db().await;

        for i in 0..10 {
            MessageRepository::create(&pool, text_message("alice", "public", &format!("m{}", i)))
                .await
                .unwrap();
        }

        let history = MessageRepository::public_history(&pool, 3).await.unwrap();
        assert_eq!(history.len(), 3);
        // Cap keeps the ascending prefix
        assert_eq!(history[0].text.as_deref(), Some("m0"));
    }

    #[tokio::test]
    async fn test_delete_all() {
        let pool = setup_test_db().await;

        MessageRepository::create(&pool, text_message("alice", "public", "hi"))
            .await
            .unwrap();
        MessageRepository::create(&pool, text_message("bob", "alice", "yo"))
            .await
            .unwrap();

        let deleted = MessageRepository::delete_all(&pool).await.unwrap();
        assert_eq!(deleted, 2);

        let history = MessageRepository::public_history(&pool, 100).await.unwrap();
        assert!(history.is_empty());
    }
}
