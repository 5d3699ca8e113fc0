//! `WebSocket` handler: upgrade, session loop, teardown.
//!
//! Each accepted socket runs one task that multiplexes two streams: the
//! engine's outbound channel for this connection, and the client's
//! inbound frames. Outbound writes happen only here, so each
//! connection's stream is serialized by construction.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::debug;
use veldt_types::ServerMessage;

use crate::server::GatewayState;
use crate::session::Session;

/// Upgrade an HTTP request to a `WebSocket` connection and run the
/// session until either side hangs up.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Run one connection's session loop.
async fn handle_socket(mut socket: WebSocket, state: Arc<GatewayState>) {
    debug!("Client connected");
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let mut session = Session::new(
        Arc::clone(&state.registry),
        Arc::clone(&state.shared),
        outbound_tx,
    );

    // First contact: ask the client to authenticate.
    if send_json(&mut socket, &ServerMessage::AuthPrompt).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            // Engine -> client: tick updates, rejections, replies.
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(message) => {
                        if send_json(&mut socket, &message).await.is_err() {
                            debug!("Client disconnected (send failed)");
                            break;
                        }
                    }
                    None => break,
                }
            }
            // Client -> engine: auth, role, actions, pings.
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        session.on_text(text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Client disconnected");
                        break;
                    }
                    Some(Err(error)) => {
                        debug!(%error, "WebSocket error");
                        break;
                    }
                    // Binary and pong frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    session.on_disconnect();
}

/// Serialize and send one message as a text frame.
async fn send_json(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(error) => {
            tracing::warn!(%error, "Failed to serialize outbound message");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
