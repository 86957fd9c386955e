//! Chat message endpoints
//!
//! Messages are persisted first, then fanned out to the session's live
//! WebSocket members through the relay. Fan-out is best-effort; a session
//! with no connected members still accepts messages.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::http::{AppResult, AppState};
use huddle_core::models::{ChatMessage, SessionId};
use huddle_core::relay::Payload;

/// Send chat message request
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub username: String,
    pub message: String,
}

/// Send a chat message
///
/// POST /api/sessions/{session_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ChatMessage>> {
    let session_id = SessionId::from_string(session_id);

    let message = state
        .chat_service
        .send(session_id.clone(), req.username, req.message)
        .await?;

    // Live members get the stored message wrapped in a typed envelope
    let envelope = serde_json::to_string(&json!({
        "type": "message",
        "data": message,
    }))
    .map_err(huddle_core::Error::from)?;

    let delivered = state.relay.send_text(&session_id, &Payload::from(envelope));
    debug!(
        session_id = %session_id,
        delivered = delivered,
        "chat message broadcast"
    );

    Ok(Json(message))
}

/// Get chat history, oldest first
///
/// GET /api/sessions/{session_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let session_id = SessionId::from_string(session_id);
    let messages = state.chat_service.history(&session_id).await?;
    Ok(Json(messages))
}
