//! Router-level tests for the REST surface, run against an in-memory
//! SQLite database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use huddle_core::relay::RelayManager;
use huddle_core::repository::{ChatRepository, SessionRepository};
use huddle_core::service::{ChatService, SessionService};

async fn test_router() -> axum::Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let session_service = Arc::new(SessionService::new(
        Arc::new(SessionRepository::new(pool.clone())),
        6,
    ));
    let chat_service = Arc::new(ChatService::new(Arc::new(ChatRepository::new(pool))));

    huddle_api::http::create_router(
        session_service,
        chat_service,
        Arc::new(RelayManager::new()),
        &["*".to_string()],
    )
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse body")
}

#[tokio::test]
async fn test_health_probe() {
    let router = test_router().await;
    let response = router.oneshot(get_request("/health")).await.expect("call");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_create_and_fetch_session() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/sessions",
            json!({ "session_type": "text" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);

    let created = response_json(response).await;
    assert_eq!(created["session_type"], "text");
    assert_eq!(created["is_active"], true);
    let code = created["code"].as_str().expect("code").to_string();
    assert_eq!(code.len(), 6);

    let response = router
        .oneshot(get_request(&format!("/api/sessions/{code}")))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn test_invalid_session_type_is_rejected() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/sessions",
            json!({ "session_type": "carrier-pigeon" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_session_code_is_404() {
    let router = test_router().await;
    let response = router
        .oneshot(get_request("/api/sessions/ZZZZZZ"))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_close_session() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/sessions",
            json!({ "session_type": "stream" }),
        ))
        .await
        .expect("call");
    let code = response_json(response).await["code"]
        .as_str()
        .expect("code")
        .to_string();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/sessions/{code}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);

    // Closed sessions are no longer resolvable
    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/sessions/{code}")))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Closing again reports 404
    let response = router
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/sessions/{code}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_and_list_messages() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/sessions/sess-1/messages",
            json!({ "username": "alice", "message": "first" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);
    let stored = response_json(response).await;
    assert_eq!(stored["username"], "alice");
    assert_eq!(stored["message"], "first");
    assert_eq!(stored["session_id"], "sess-1");

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/sessions/sess-1/messages",
            json!({ "username": "bob", "message": "second" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get_request("/api/sessions/sess-1/messages"))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);
    let history = response_json(response).await;
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["message"], "first");
    assert_eq!(history[1]["message"], "second");
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/sessions/sess-1/messages",
            json!({ "username": "alice", "message": "" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
