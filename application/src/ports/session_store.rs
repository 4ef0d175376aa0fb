//! Session Store port
//!
//! Durability backing for sessions: their Shared State and event history.

use async_trait::async_trait;
use think_tank_domain::{RunEvent, Session, SessionKey, SharedState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionKey),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Summary row returned by [`SessionStore::list_sessions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub key: SessionKey,
    pub last_update_ms: i64,
    pub event_count: usize,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session seeded with `initial_state`.
    ///
    /// A missing `session_id` is generated by the store.
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: SharedState,
    ) -> Result<Session, SessionStoreError>;

    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>, SessionStoreError>;

    /// Replace the stored Shared State of a session
    async fn update_state(
        &self,
        key: &SessionKey,
        state: &SharedState,
    ) -> Result<(), SessionStoreError>;

    async fn append_event(&self, key: &SessionKey, event: &RunEvent)
    -> Result<(), SessionStoreError>;

    async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, SessionStoreError>;

    async fn delete_session(&self, key: &SessionKey) -> Result<(), SessionStoreError>;
}
