//! # Chat WebSocket Endpoint
//!
//! HTTP endpoint upgrading to the bidirectional chat event channel.
//!
//! ## Endpoint
//!
//! - `GET /api/ws/chat` - WebSocket connection carrying `join` /
//!   `send_message` frames in, `new_message` frames out.
//!
//! Each connection gets a fresh [`ConnectionId`] and an unbounded outbound
//! channel attached to the presence registry. Events for one connection are
//! handled to completion in arrival order; the only suspend point inside an
//! event is the router's persistence call, so events from *different*
//! connections may interleave there.

use super::presence::{ConnectionId, PresenceRegistry};
use super::router::MessageRouter;
use super::session::ConnectionSession;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use lib_core::dto::ClientEvent;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// WebSocket handler for the chat event channel.
///
/// **Route**: `GET /api/ws/chat`
///
/// The client is expected to send a `join` frame first to bind its identity;
/// messages sent before joining are still routed with the payload identity
/// (the registry simply has no echo target for them).
pub async fn chat_websocket(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(presence): State<Arc<PresenceRegistry>>,
    State(router): State<Arc<MessageRouter>>,
) -> Response {
    let conn_id = Uuid::new_v4();

    info!(
        conn_id = %conn_id,
        client_addr = %addr,
        "[WS] CONNECT conn_id={} addr={}",
        conn_id,
        addr
    );

    ws.on_upgrade(move |socket| handle_chat_socket(socket, presence, router, conn_id))
}

/// Drive one chat connection until the socket closes.
async fn handle_chat_socket(
    socket: WebSocket,
    presence: Arc<PresenceRegistry>,
    router: Arc<MessageRouter>,
    conn_id: ConnectionId,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_start = Instant::now();

    // Outbound channel: the registry owns the sender half, this task drains
    // the receiver half into the socket.
    let (tx, mut rx) = mpsc::unbounded_channel();
    presence.attach(conn_id, tx).await;
    let mut session = ConnectionSession::new(conn_id);

    let send_conn_id = conn_id;
    let send_task = tokio::spawn(async move {
        let mut sent: u64 = 0;
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(
                        conn_id = %send_conn_id,
                        error = %e,
                        "[WS] SERIALIZE_ERROR conn_id={} error={}",
                        send_conn_id,
                        e
                    );
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            sent += 1;
        }
        sent
    });

    let mut events_received: u64 = 0;
    let mut messages_routed: u64 = 0;

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                events_received += 1;
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::Join(payload)) => {
                        info!(
                            conn_id = %conn_id,
                            user_id = %payload.user_id,
                            "[WS] JOIN conn_id={} user_id={}",
                            conn_id,
                            payload.user_id
                        );
                        session.bind(&presence, payload.user_id).await;
                    }
                    Ok(ClientEvent::SendMessage(incoming)) => {
                        // Route failures are local to this message; the
                        // connection loop keeps going.
                        match router.route(&session, incoming).await {
                            Ok(stored) => {
                                messages_routed += 1;
                                debug!(
                                    conn_id = %conn_id,
                                    message_id = stored.id,
                                    "[WS] ROUTED conn_id={} message_id={}",
                                    conn_id,
                                    stored.id
                                );
                            }
                            Err(e) => {
                                warn!(
                                    conn_id = %conn_id,
                                    error = %e,
                                    "[WS] ROUTE_FAILED conn_id={} error={}",
                                    conn_id,
                                    e
                                );
                            }
                        }
                    }
                    Err(e) => {
                        warn!(
                            conn_id = %conn_id,
                            error = %e,
                            "[WS] BAD_FRAME conn_id={} error={}",
                            conn_id,
                            e
                        );
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!(
                    conn_id = %conn_id,
                    "[WS] CLOSE_RECEIVED conn_id={}",
                    conn_id
                );
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // axum answers pings itself; nothing to do
            }
            Ok(Message::Binary(data)) => {
                debug!(
                    conn_id = %conn_id,
                    size = data.len(),
                    "[WS] BINARY_IGNORED conn_id={} size={}",
                    conn_id,
                    data.len()
                );
            }
            Err(e) => {
                error!(
                    conn_id = %conn_id,
                    error = %e,
                    "[WS] RECV_ERROR conn_id={} error={}",
                    conn_id,
                    e
                );
                break;
            }
        }
    }

    // Implicit disconnect: deregister presence keyed by the session's own
    // last-known identity, then stop broadcasting to this connection.
    // Detaching drops the registry's sender half, so the send task drains
    // and finishes on its own.
    session.close(&presence).await;
    let events_sent = send_task.await.unwrap_or(0);

    let duration = connection_start.elapsed();
    info!(
        conn_id = %conn_id,
        duration_secs = duration.as_secs_f64(),
        events_received,
        events_sent,
        messages_routed,
        "[WS] DISCONNECTED conn_id={} duration={:.2}s received={} sent={} routed={}",
        conn_id,
        duration.as_secs_f64(),
        events_received,
        events_sent,
        messages_routed
    );
}
