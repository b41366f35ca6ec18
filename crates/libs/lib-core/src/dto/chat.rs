//! # Chat Wire Protocol
//!
//! JSON events exchanged over the WebSocket channel.
//!
//! Every frame is a tagged envelope: `{"event": "...", "data": {...}}`.
//! Disconnect has no frame; it is the socket closing.

use crate::model::store::models::ChatMessage;
use serde::{Deserialize, Serialize};

/// Payload of the `join` event: the identity a connection binds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub user_id: String,
}

/// Inbound message payload, as supplied by the client.
///
/// `sender_id` is client-supplied and cross-checked against the connection's
/// bound identity by the router; the timestamp is never accepted from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageIn {
    pub sender_id: String,
    pub sender_name: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Events a client may send to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind this connection to a logical user identity.
    Join(JoinPayload),
    /// Persist and route a message.
    SendMessage(MessageIn),
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message delivered per the fan-out rules, with its persisted
    /// id and server-assigned timestamp.
    NewMessage(ChatMessage),
}
