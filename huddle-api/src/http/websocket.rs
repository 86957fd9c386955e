//! WebSocket handlers for live chat and stream signaling.
//!
//! Each accepted socket registers a relay connection and is split in two: a
//! writer task pumps the connection's relay queue into the sink, while the
//! read loop owns the registration and deregisters on every exit path
//! (graceful close, read error, task end). The relay never closes the
//! socket itself.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::http::{AppError, AppState};
use huddle_core::models::SessionId;
use huddle_core::relay::{ConnectionHandle, Payload, StreamRole};

/// WebSocket endpoint for a session's chat stream
///
/// GET /ws/text/{session_id}
pub async fn ws_text_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_text_socket(socket, state, session_id))
}

async fn handle_text_socket(socket: WebSocket, state: AppState, session_id: String) {
    let session_id = SessionId::from_string(session_id);
    let (conn, rx) = ConnectionHandle::channel();

    info!(
        session_id = %session_id,
        connection_id = %conn.id(),
        "text WebSocket connected"
    );
    state.relay.join_text(&session_id, conn.clone());

    let (sink, mut receiver) = socket.split();
    spawn_writer(sink, rx);

    while let Some(frame) = receiver.next().await {
        let Ok(msg) = frame else { break };
        match msg {
            Message::Text(text) => {
                // Inbound frames on the chat socket are keepalives only; real
                // messages arrive over the REST endpoint and fan out from there.
                if is_ping(&text) {
                    let _ = conn.send(Payload::from(r#"{"type":"pong"}"#));
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.relay.leave_text(&session_id, conn.id());
    info!(
        session_id = %session_id,
        connection_id = %conn.id(),
        "text WebSocket closed"
    );
}

/// WebSocket endpoint for a session's signaling stream
///
/// GET /ws/stream/{session_id}/{role}
pub async fn ws_stream_handler(
    State(state): State<AppState>,
    Path((session_id, role)): Path<(String, String)>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    // The role token is part of the caller contract: reject it here, never
    // inside the relay.
    let role: StreamRole = role
        .parse()
        .map_err(|_| AppError::bad_request(format!("Invalid stream role: {role}")))?;

    Ok(ws.on_upgrade(move |socket| handle_stream_socket(socket, state, session_id, role)))
}

async fn handle_stream_socket(
    socket: WebSocket,
    state: AppState,
    session_id: String,
    role: StreamRole,
) {
    let session_id = SessionId::from_string(session_id);
    let (conn, rx) = ConnectionHandle::channel();

    info!(
        session_id = %session_id,
        connection_id = %conn.id(),
        role = %role,
        "stream WebSocket connected"
    );
    state.relay.join_stream(&session_id, conn.clone(), role);

    let (sink, mut receiver) = socket.split();
    spawn_writer(sink, rx);

    while let Some(frame) = receiver.next().await {
        let Ok(msg) = frame else { break };
        match msg {
            Message::Text(text) => {
                // Signals are opaque; forwarded verbatim, routed by the
                // sender's role at the time of the call.
                let delivered =
                    state
                        .relay
                        .send_signal(&session_id, &Payload::from(text.as_str()), conn.id());
                debug!(
                    session_id = %session_id,
                    connection_id = %conn.id(),
                    delivered = delivered,
                    "signal relayed"
                );
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.relay.leave_stream(&session_id, conn.id());
    info!(
        session_id = %session_id,
        connection_id = %conn.id(),
        "stream WebSocket closed"
    );
}

/// Pump relayed payloads into the socket sink.
///
/// Exits when every sender for this connection is gone (the read loop has
/// deregistered it) or when a send fails; the failed socket is then picked
/// up by the relay's lazy eviction on the next delivery attempt.
fn spawn_writer(
    mut sink: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: tokio::sync::mpsc::UnboundedReceiver<Payload>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = sink.send(Message::Text(payload.to_string().into())).await {
                debug!("WebSocket send failed: {}", e);
                break;
            }
        }
    })
}

fn is_ping(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
        .is_some_and(|t| t == "ping")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ping() {
        assert!(is_ping(r#"{"type":"ping"}"#));
        assert!(!is_ping(r#"{"type":"pong"}"#));
        assert!(!is_ping("not json"));
        assert!(!is_ping(r#"{"kind":"ping"}"#));
    }
}
