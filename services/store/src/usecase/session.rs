use campus_domain::id::new_id;
use campus_domain::serde::now;

use crate::domain::repository::SessionRepository;
use crate::domain::types::Session;
use crate::error::StoreError;

// ── CreateSession ────────────────────────────────────────────────────────────

pub struct CreateSessionUseCase<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> CreateSessionUseCase<S> {
    pub async fn execute(&self, user_id: &str) -> Result<Session, StoreError> {
        let session = Session::new(new_id(), user_id, now());
        self.sessions.create(&session).await?;
        Ok(session)
    }
}

// ── ValidateSession ──────────────────────────────────────────────────────────

pub struct ValidateSessionUseCase<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> ValidateSessionUseCase<S> {
    /// True iff the session exists and has not expired.
    pub async fn execute(&self, user_id: &str, session_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .sessions
            .find(user_id, session_id)
            .await?
            .is_some_and(|s| s.is_valid_at(now())))
    }
}

// ── DeleteSession ────────────────────────────────────────────────────────────

pub struct DeleteSessionUseCase<S: SessionRepository> {
    pub sessions: S,
}

impl<S: SessionRepository> DeleteSessionUseCase<S> {
    pub async fn execute(&self, user_id: &str, session_id: &str) -> Result<(), StoreError> {
        self.sessions.delete(user_id, session_id).await
    }
}
