//! # Chat Core
//!
//! Presence-aware message routing and delivery.
//!
//! The pieces, leaf first:
//!
//! - **[`presence`]**: in-memory registry mapping logical user identities to
//!   live connections; the only shared mutable state in the system.
//! - **[`session`]**: per-connection state machine binding a raw channel to a
//!   user identity after the `join` handshake.
//! - **[`router`]**: persists every inbound message, then decides the
//!   delivery fan-out (broadcast vs. targeted) against the registry.
//! - **[`ws`]**: the WebSocket endpoint wiring a socket to all of the above.

pub mod presence;
pub mod router;
pub mod session;
pub mod ws;

pub use presence::{ConnectionId, PresenceRegistry};
pub use router::{MessageRouter, RouteError};
pub use session::ConnectionSession;
pub use ws::chat_websocket;
