use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::http::AppState;

/// Liveness/readiness probes
pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
