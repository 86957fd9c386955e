//! Repository and service tests against an in-memory SQLite database.

use std::sync::Arc;

use huddle_core::models::{ChatMessage, Session, SessionKind};
use huddle_core::repository::{ChatRepository, SessionRepository};
use huddle_core::service::{ChatService, SessionService};
use huddle_core::Error;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

#[tokio::test]
async fn test_session_create_and_find_by_code() {
    let repo = SessionRepository::new(test_pool().await);

    let session = Session::new("ABC234".to_string(), SessionKind::Text);
    let created = repo.create(&session).await.expect("create");
    assert_eq!(created.code, "ABC234");
    assert_eq!(created.kind, SessionKind::Text);
    assert!(created.is_active);

    let found = repo
        .find_active_by_code("ABC234")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found.id, session.id);
    assert_eq!(
        found.created_at.timestamp_millis(),
        session.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn test_duplicate_code_maps_to_already_exists() {
    let repo = SessionRepository::new(test_pool().await);

    let first = Session::new("SAMECD".to_string(), SessionKind::Text);
    repo.create(&first).await.expect("create");

    let second = Session::new("SAMECD".to_string(), SessionKind::Stream);
    let err = repo.create(&second).await.expect_err("unique violation");
    assert!(matches!(err, Error::AlreadyExists(_)));
}

#[tokio::test]
async fn test_deactivated_session_is_not_found() {
    let pool = test_pool().await;
    let repo = SessionRepository::new(pool);

    let session = Session::new("GONE42".to_string(), SessionKind::Stream);
    repo.create(&session).await.expect("create");

    assert!(repo.deactivate("GONE42").await.expect("deactivate"));
    assert!(repo
        .find_active_by_code("GONE42")
        .await
        .expect("find")
        .is_none());

    // Unknown code deactivation reports false
    assert!(!repo.deactivate("NOPE99").await.expect("deactivate"));
}

#[tokio::test]
async fn test_chat_messages_round_trip_in_order() {
    let pool = test_pool().await;
    let repo = ChatRepository::new(pool);

    let session = Session::new("CHAT77".to_string(), SessionKind::Text);
    for i in 0..3 {
        let msg = ChatMessage::new(
            session.id.clone(),
            "alice".to_string(),
            format!("message {i}"),
        );
        repo.create(&msg).await.expect("create message");
    }

    let history = repo.list_by_session(&session.id, 1000).await.expect("list");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].message, "message 0");
    assert_eq!(history[2].message, "message 2");
    assert!(history.iter().all(|m| m.session_id == session.id));
}

#[tokio::test]
async fn test_session_service_generates_code_and_resolves() {
    let pool = test_pool().await;
    let service = SessionService::new(Arc::new(SessionRepository::new(pool)), 6);

    let session = service.create(SessionKind::Stream).await.expect("create");
    assert_eq!(session.code.len(), 6);

    let resolved = service.get_by_code(&session.code).await.expect("resolve");
    assert_eq!(resolved.id, session.id);

    service.close(&session.code).await.expect("close");
    let err = service.get_by_code(&session.code).await.expect_err("gone");
    assert!(matches!(err, Error::NotFound(_)));

    let err = service.close("ZZZZZZ").await.expect_err("unknown code");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_chat_service_validates_content() {
    let pool = test_pool().await;
    let service = ChatService::new(Arc::new(ChatRepository::new(pool)));

    let session = Session::new("VALID1".to_string(), SessionKind::Text);

    let err = service
        .send(session.id.clone(), "bob".to_string(), String::new())
        .await
        .expect_err("empty content");
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = service
        .send(session.id.clone(), "  ".to_string(), "hi".to_string())
        .await
        .expect_err("blank username");
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = service
        .send(session.id.clone(), "bob".to_string(), "x".repeat(501))
        .await
        .expect_err("too long");
    assert!(matches!(err, Error::InvalidInput(_)));

    let stored = service
        .send(session.id.clone(), "bob".to_string(), "hello".to_string())
        .await
        .expect("send");
    assert_eq!(stored.message, "hello");

    let history = service.history(&session.id).await.expect("history");
    assert_eq!(history.len(), 1);
}
