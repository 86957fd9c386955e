// Module: http
// HTTP/JSON REST API plus the WebSocket endpoints

pub mod chat;
pub mod error;
pub mod health;
pub mod session;
pub mod websocket;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use huddle_core::relay::RelayManager;
use huddle_core::service::{ChatService, SessionService};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub chat_service: Arc<ChatService>,
    pub relay: Arc<RelayManager>,
}

/// Create the HTTP router with all routes
pub fn create_router(
    session_service: Arc<SessionService>,
    chat_service: Arc<ChatService>,
    relay: Arc<RelayManager>,
    cors_origins: &[String],
) -> Router {
    let state = AppState {
        session_service,
        chat_service,
        relay,
    };

    let router = Router::new()
        // Health check endpoints (for monitoring probes)
        .merge(health::create_health_router())
        // Session management
        .route("/api/sessions", post(session::create_session))
        .route("/api/sessions/{code}", get(session::get_session))
        .route("/api/sessions/{code}", delete(session::close_session))
        // Chat messages
        .route(
            "/api/sessions/{session_id}/messages",
            post(chat::send_message),
        )
        .route(
            "/api/sessions/{session_id}/messages",
            get(chat::get_messages),
        )
        // WebSocket endpoints for real-time messaging
        .route("/ws/text/{session_id}", get(websocket::ws_text_handler))
        .route(
            "/ws/stream/{session_id}/{role}",
            get(websocket::ws_stream_handler),
        );

    // Apply layers before state
    let router = router
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http());

    // Apply state to all routes (must be last)
    router.with_state(state)
}

/// Build a CORS layer from configured origins; `*` allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any)
    }
}
