use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    models::{ChatMessage, SessionId},
    Result,
};

/// Chat message repository for database operations
#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new chat message
    pub async fn create(&self, message: &ChatMessage) -> Result<ChatMessage> {
        let row = sqlx::query(
            r"
            INSERT INTO chat_messages (id, session_id, username, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, session_id, username, content, created_at
            ",
        )
        .bind(&message.id)
        .bind(message.session_id.as_str())
        .bind(&message.username)
        .bind(&message.message)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_message(&row)
    }

    /// Get chat history for a session in chronological order (oldest first)
    pub async fn list_by_session(
        &self,
        session_id: &SessionId,
        limit: i64,
    ) -> Result<Vec<ChatMessage>> {
        let limit = limit.min(1000); // Cap history per request

        let rows = sqlx::query(
            r"
            SELECT id, session_id, username, content, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            ",
        )
        .bind(session_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_message).collect()
    }

    fn row_to_message(row: &SqliteRow) -> Result<ChatMessage> {
        Ok(ChatMessage {
            id: row.try_get("id")?,
            session_id: SessionId::from_string(row.try_get("session_id")?),
            username: row.try_get("username")?,
            message: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
