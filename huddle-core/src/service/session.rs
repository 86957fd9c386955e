//! Session lifecycle: create with a generated join code, resolve by code,
//! close.

use std::sync::Arc;
use tracing::info;

use crate::{
    models::{session::generate_code, Session, SessionKind},
    repository::SessionRepository,
    Error, Result,
};

/// How many times to retry on a join-code collision before giving up
const CODE_RETRIES: usize = 3;

#[derive(Clone)]
pub struct SessionService {
    repository: Arc<SessionRepository>,
    code_length: usize,
}

impl SessionService {
    #[must_use]
    pub const fn new(repository: Arc<SessionRepository>, code_length: usize) -> Self {
        Self {
            repository,
            code_length,
        }
    }

    /// Create a session of the given kind with a fresh join code.
    ///
    /// Codes are unique among all sessions; on the unlikely collision the
    /// insert is retried with a new code.
    pub async fn create(&self, kind: SessionKind) -> Result<Session> {
        let mut last_err = None;
        for _ in 0..CODE_RETRIES {
            let session = Session::new(generate_code(self.code_length), kind);
            match self.repository.create(&session).await {
                Ok(created) => {
                    info!(
                        session_id = %created.id,
                        code = %created.code,
                        kind = %created.kind,
                        "session created"
                    );
                    return Ok(created);
                }
                Err(Error::AlreadyExists(_)) => {
                    last_err = Some(Error::AlreadyExists("Join code collision".to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err
            .unwrap_or_else(|| Error::Internal("Session creation failed".to_string())))
    }

    /// Resolve an active session by its join code
    pub async fn get_by_code(&self, code: &str) -> Result<Session> {
        self.repository
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    /// Close a session; it stops being joinable but its history remains
    pub async fn close(&self, code: &str) -> Result<()> {
        if self.repository.deactivate(code).await? {
            info!(code = %code, "session closed");
            Ok(())
        } else {
            Err(Error::NotFound("Session not found".to_string()))
        }
    }
}
