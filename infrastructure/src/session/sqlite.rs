//! Durable session store on SQLite
//!
//! Shared State is stored as one JSON document per session; events are
//! appended to their own table in insertion order.

use super::{new_session_id, now_ms};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use think_tank_application::ports::session_store::{
    SessionStore, SessionStoreError, SessionSummary,
};
use think_tank_domain::{RunEvent, Session, SessionKey, SharedState};
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    app_name TEXT NOT NULL,
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    state TEXT NOT NULL,
    last_update_ms INTEGER NOT NULL,
    PRIMARY KEY (app_name, user_id, session_id)
);

CREATE TABLE IF NOT EXISTS session_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_name TEXT NOT NULL,
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    event TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_session_events_key
    ON session_events (app_name, user_id, session_id);
"#;

fn storage(error: impl std::fmt::Display) -> SessionStoreError {
    SessionStoreError::Storage(error.to_string())
}

fn serialization(error: serde_json::Error) -> SessionStoreError {
    SessionStoreError::Serialization(error.to_string())
}

/// Session store persisted to a SQLite database file
#[derive(Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self, SessionStoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(storage)?;
        }
        let conn = Connection::open(path).map_err(storage)?;
        info!("Session database: {}", path.display());
        Self::with_connection(conn)
    }

    /// A database that lives only as long as the store
    pub fn open_in_memory() -> Result<Self, SessionStoreError> {
        Self::with_connection(Connection::open_in_memory().map_err(storage)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, SessionStoreError> {
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn blocking<T, F>(&self, f: F) -> Result<T, SessionStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, SessionStoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(storage)?;
            f(&mut *guard)
        })
        .await
        .map_err(storage)?
    }
}

fn session_exists(conn: &Connection, key: &SessionKey) -> Result<bool, SessionStoreError> {
    conn.query_row(
        "SELECT 1 FROM sessions WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3",
        params![key.app_name, key.user_id, key.session_id],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(storage)
}

fn touch(conn: &Connection, key: &SessionKey) -> Result<usize, SessionStoreError> {
    conn.execute(
        "UPDATE sessions SET last_update_ms = ?4
         WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3",
        params![key.app_name, key.user_id, key.session_id, now_ms()],
    )
    .map_err(storage)
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: SharedState,
    ) -> Result<Session, SessionStoreError> {
        let id = session_id.map(str::to_string).unwrap_or_else(new_session_id);
        let key = SessionKey::new(app_name, user_id, id);
        let state_json = serde_json::to_string(&initial_state).map_err(serialization)?;
        let session = Session::new(key.clone(), initial_state, now_ms());
        let created_at = session.last_update_ms;

        self.blocking(move |conn| {
            if session_exists(conn, &key)? {
                return Err(SessionStoreError::AlreadyExists(key));
            }
            conn.execute(
                "INSERT INTO sessions (app_name, user_id, session_id, state, last_update_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key.app_name, key.user_id, key.session_id, state_json, created_at],
            )
            .map_err(storage)?;
            debug!("Created session {}", key);
            Ok(())
        })
        .await?;
        Ok(session)
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>, SessionStoreError> {
        let key = key.clone();
        self.blocking(move |conn| {
            let row: Option<(String, i64)> = conn
                .query_row(
                    "SELECT state, last_update_ms FROM sessions
                     WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3",
                    params![key.app_name, key.user_id, key.session_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(storage)?;
            let Some((state_json, last_update_ms)) = row else {
                return Ok(None);
            };
            let state: SharedState = serde_json::from_str(&state_json).map_err(serialization)?;

            let mut stmt = conn
                .prepare(
                    "SELECT event FROM session_events
                     WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3
                     ORDER BY id",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![key.app_name, key.user_id, key.session_id], |row| {
                    row.get::<_, String>(0)
                })
                .map_err(storage)?;
            let mut events = Vec::new();
            for row in rows {
                let json = row.map_err(storage)?;
                events.push(serde_json::from_str::<RunEvent>(&json).map_err(serialization)?);
            }

            let mut session = Session::new(key, state, last_update_ms);
            session.events = events;
            Ok(Some(session))
        })
        .await
    }

    async fn update_state(
        &self,
        key: &SessionKey,
        state: &SharedState,
    ) -> Result<(), SessionStoreError> {
        let key = key.clone();
        let state_json = serde_json::to_string(state).map_err(serialization)?;
        self.blocking(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE sessions SET state = ?4, last_update_ms = ?5
                     WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3",
                    params![key.app_name, key.user_id, key.session_id, state_json, now_ms()],
                )
                .map_err(storage)?;
            if updated == 0 {
                return Err(SessionStoreError::NotFound(key));
            }
            Ok(())
        })
        .await
    }

    async fn append_event(
        &self,
        key: &SessionKey,
        event: &RunEvent,
    ) -> Result<(), SessionStoreError> {
        let key = key.clone();
        let event_json = serde_json::to_string(event).map_err(serialization)?;
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(storage)?;
            if touch(&tx, &key)? == 0 {
                return Err(SessionStoreError::NotFound(key));
            }
            tx.execute(
                "INSERT INTO session_events (app_name, user_id, session_id, event)
                 VALUES (?1, ?2, ?3, ?4)",
                params![key.app_name, key.user_id, key.session_id, event_json],
            )
            .map_err(storage)?;
            tx.commit().map_err(storage)
        })
        .await
    }

    async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, SessionStoreError> {
        let app_name = app_name.to_string();
        let user_id = user_id.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT s.session_id, s.last_update_ms,
                            (SELECT COUNT(*) FROM session_events e
                             WHERE e.app_name = s.app_name AND e.user_id = s.user_id
                               AND e.session_id = s.session_id)
                     FROM sessions s
                     WHERE s.app_name = ?1 AND s.user_id = ?2
                     ORDER BY s.last_update_ms DESC",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![app_name, user_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })
                .map_err(storage)?;

            let mut summaries = Vec::new();
            for row in rows {
                let (session_id, last_update_ms, count) = row.map_err(storage)?;
                summaries.push(SessionSummary {
                    key: SessionKey::new(&app_name, &user_id, session_id),
                    last_update_ms,
                    event_count: count as usize,
                });
            }
            Ok(summaries)
        })
        .await
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        let key = key.clone();
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(storage)?;
            tx.execute(
                "DELETE FROM session_events
                 WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3",
                params![key.app_name, key.user_id, key.session_id],
            )
            .map_err(storage)?;
            let deleted = tx
                .execute(
                    "DELETE FROM sessions
                     WHERE app_name = ?1 AND user_id = ?2 AND session_id = ?3",
                    params![key.app_name, key.user_id, key.session_id],
                )
                .map_err(storage)?;
            if deleted == 0 {
                return Err(SessionStoreError::NotFound(key));
            }
            tx.commit().map_err(storage)
        })
        .await
    }
}
