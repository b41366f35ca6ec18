use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sentinel recipient for broadcast messages.
pub const PUBLIC_RECIPIENT: &str = "public";

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Data structure for creating a new user.
///
/// Contains only the fields required for user creation.
/// Password should be hashed before creating.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
}

impl UserForCreate {
    /// Create a new `UserForCreate` instance.
    pub fn new(username: String, password_hash: String, display_name: String) -> Self {
        Self {
            username,
            password_hash,
            display_name,
        }
    }
}

/// Data structure for updating an existing user.
///
/// All fields are optional - only provided fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UserForUpdate {
    pub display_name: Option<String>,
    pub profile_pic: Option<String>,
    pub is_active: Option<bool>,
}

impl UserForUpdate {
    /// Create a new empty `UserForUpdate` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn display_name(mut self, display_name: String) -> Self {
        self.display_name = Some(display_name);
        self
    }

    /// Set the profile picture (URL or data URI).
    pub fn profile_pic(mut self, profile_pic: String) -> Self {
        self.profile_pic = Some(profile_pic);
        self
    }

    /// Set the active status.
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Public view of a user for the contact list.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub display_name: String,
    pub profile_pic: Option<String>,
}

/// Persisted chat message.
///
/// Messages are append-only: once created they are never mutated or deleted
/// by the routing subsystem. `recipient` is either [`PUBLIC_RECIPIENT`] or a
/// target user identity; on the wire it is serialized as `to`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(rename = "to")]
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Whether this message is a public broadcast.
    pub fn is_public(&self) -> bool {
        self.recipient == PUBLIC_RECIPIENT
    }
}

/// Data structure for persisting a new chat message.
///
/// The timestamp is assigned by the store at persistence time, never taken
/// from the client.
#[derive(Debug, Clone)]
pub struct MessageForCreate {
    pub sender_id: String,
    pub sender_name: String,
    pub recipient: String,
    pub text: Option<String>,
    pub image: Option<String>,
}
