//! Chat message persistence and history.
//!
//! Live fan-out to connected sockets is the relay's job; this service only
//! validates and stores.

use std::sync::Arc;

use crate::{
    models::{ChatMessage, SessionId},
    repository::ChatRepository,
    Error, Result,
};

/// Maximum chat message length in bytes
const MAX_MESSAGE_LEN: usize = 500;

/// Default number of history entries returned per request
const HISTORY_LIMIT: i64 = 1000;

#[derive(Clone)]
pub struct ChatService {
    repository: Arc<ChatRepository>,
}

impl ChatService {
    #[must_use]
    pub const fn new(repository: Arc<ChatRepository>) -> Self {
        Self { repository }
    }

    /// Validate and persist a chat message
    pub async fn send(
        &self,
        session_id: SessionId,
        username: String,
        content: String,
    ) -> Result<ChatMessage> {
        if username.trim().is_empty() {
            return Err(Error::InvalidInput("Username cannot be empty".to_string()));
        }
        if content.is_empty() {
            return Err(Error::InvalidInput(
                "Message content cannot be empty".to_string(),
            ));
        }
        if content.len() > MAX_MESSAGE_LEN {
            return Err(Error::InvalidInput(format!(
                "Message content must be at most {MAX_MESSAGE_LEN} characters"
            )));
        }

        let message = ChatMessage::new(session_id, username, content);
        self.repository.create(&message).await
    }

    /// Stored messages for a session, oldest first
    pub async fn history(&self, session_id: &SessionId) -> Result<Vec<ChatMessage>> {
        self.repository
            .list_by_session(session_id, HISTORY_LIMIT)
            .await
    }
}
