use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::SessionId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String, // nanoid(12)
    pub session_id: SessionId,
    pub username: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(session_id: SessionId, username: String, message: String) -> Self {
        Self {
            id: super::id::generate_id(),
            session_id,
            username,
            message,
            created_at: Utc::now(),
        }
    }
}
