use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    models::{Session, SessionId, SessionKind},
    Error, Result,
};

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new session
    pub async fn create(&self, session: &Session) -> Result<Session> {
        let row = sqlx::query(
            r"
            INSERT INTO sessions (id, code, kind, created_at, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, code, kind, created_at, is_active
            ",
        )
        .bind(session.id.as_str())
        .bind(&session.code)
        .bind(session.kind.as_str())
        .bind(session.created_at)
        .bind(session.is_active)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_session(&row)
    }

    /// Look up an active session by its join code
    pub async fn find_active_by_code(&self, code: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r"
            SELECT id, code, kind, created_at, is_active
            FROM sessions
            WHERE code = $1 AND is_active = TRUE
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    /// Mark a session inactive. Returns false when the code is unknown.
    pub async fn deactivate(&self, code: &str) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE sessions
            SET is_active = FALSE
            WHERE code = $1
            ",
        )
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_session(row: &SqliteRow) -> Result<Session> {
        let kind: String = row.try_get("kind")?;
        let kind: SessionKind = kind
            .parse()
            .map_err(|_| Error::Internal(format!("Unknown session kind in database: {kind}")))?;

        Ok(Session {
            id: SessionId::from_string(row.try_get("id")?),
            code: row.try_get("code")?,
            kind,
            created_at: row.try_get("created_at")?,
            is_active: row.try_get("is_active")?,
        })
    }
}
