//! Session store adapters

pub mod memory;
pub mod sqlite;

pub use memory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;

use crate::config::{FileSessionConfig, SessionBackend};
use async_trait::async_trait;
use chrono::Utc;
use think_tank_application::ports::session_store::{
    SessionStore, SessionStoreError, SessionSummary,
};
use think_tank_domain::{RunEvent, Session, SessionKey, SharedState};

/// Epoch milliseconds used as `last_update_ms`
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Session id for a store-generated session
pub(crate) fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The session store selected by `[session].backend`
pub enum ConfiguredSessionStore {
    Memory(InMemorySessionStore),
    Sqlite(SqliteSessionStore),
}

impl ConfiguredSessionStore {
    pub fn open(config: &FileSessionConfig) -> Result<Self, SessionStoreError> {
        Ok(match config.backend {
            SessionBackend::Memory => Self::Memory(InMemorySessionStore::new()),
            SessionBackend::Sqlite => Self::Sqlite(SqliteSessionStore::open(&config.sqlite_path)?),
        })
    }

    fn inner(&self) -> &dyn SessionStore {
        match self {
            Self::Memory(store) => store,
            Self::Sqlite(store) => store,
        }
    }
}

#[async_trait]
impl SessionStore for ConfiguredSessionStore {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: SharedState,
    ) -> Result<Session, SessionStoreError> {
        self.inner()
            .create_session(app_name, user_id, session_id, initial_state)
            .await
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>, SessionStoreError> {
        self.inner().get_session(key).await
    }

    async fn update_state(
        &self,
        key: &SessionKey,
        state: &SharedState,
    ) -> Result<(), SessionStoreError> {
        self.inner().update_state(key, state).await
    }

    async fn append_event(
        &self,
        key: &SessionKey,
        event: &RunEvent,
    ) -> Result<(), SessionStoreError> {
        self.inner().append_event(key, event).await
    }

    async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, SessionStoreError> {
        self.inner().list_sessions(app_name, user_id).await
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        self.inner().delete_session(key).await
    }
}
