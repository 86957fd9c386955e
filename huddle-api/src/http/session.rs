//! Session management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{AppError, AppResult, AppState};
use huddle_core::models::{Session, SessionKind};

/// Create session request
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub session_type: String,
}

/// Create a session with a fresh join code
///
/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<Json<Session>> {
    // Kind token is validated at the boundary; anything else is a 400
    let kind: SessionKind = req
        .session_type
        .parse()
        .map_err(|_| AppError::bad_request(format!("Invalid session type: {}", req.session_type)))?;

    let session = state.session_service.create(kind).await?;
    Ok(Json(session))
}

/// Look up an active session by join code
///
/// GET /api/sessions/{code}
pub async fn get_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Session>> {
    let session = state.session_service.get_by_code(&code).await?;
    Ok(Json(session))
}

/// Close a session so it can no longer be joined
///
/// DELETE /api/sessions/{code}
pub async fn close_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Value>> {
    state.session_service.close(&code).await?;
    Ok(Json(json!({ "message": "Session closed" })))
}
