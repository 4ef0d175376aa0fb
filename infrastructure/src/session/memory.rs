//! Process-local session store

use super::{new_session_id, now_ms};
use async_trait::async_trait;
use std::collections::BTreeMap;
use think_tank_application::ports::session_store::{
    SessionStore, SessionStoreError, SessionSummary,
};
use think_tank_domain::{RunEvent, Session, SessionKey, SharedState};
use tokio::sync::RwLock;

/// Sessions held in memory for the lifetime of the process
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<BTreeMap<SessionKey, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: SharedState,
    ) -> Result<Session, SessionStoreError> {
        let id = session_id.map(str::to_string).unwrap_or_else(new_session_id);
        let key = SessionKey::new(app_name, user_id, id);

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&key) {
            return Err(SessionStoreError::AlreadyExists(key));
        }
        let session = Session::new(key.clone(), initial_state, now_ms());
        sessions.insert(key, session.clone());
        Ok(session)
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn update_state(
        &self,
        key: &SessionKey,
        state: &SharedState,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))?;
        session.state = state.clone();
        session.last_update_ms = now_ms();
        Ok(())
    }

    async fn append_event(
        &self,
        key: &SessionKey,
        event: &RunEvent,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))?;
        session.events.push(event.clone());
        session.last_update_ms = now_ms();
        Ok(())
    }

    async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, SessionStoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.key.app_name == app_name && s.key.user_id == user_id)
            .map(|s| SessionSummary {
                key: s.key.clone(),
                last_update_ms: s.last_update_ms,
                event_count: s.events.len(),
            })
            .collect())
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use think_tank_domain::{StateKey, keys};

    #[tokio::test]
    async fn test_create_generates_distinct_ids() {
        let store = InMemorySessionStore::new();
        let a = store.create_session("app", "u", None, SharedState::new()).await.unwrap();
        let b = store.create_session("app", "u", None, SharedState::new()).await.unwrap();
        assert_ne!(a.key, b.key);
        assert_eq!(store.list_sessions("app", "u").await.unwrap().len(), 2);
        assert!(store.list_sessions("app", "other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = InMemorySessionStore::new();
        store.create_session("app", "u", Some("s"), SharedState::new()).await.unwrap();
        let error = store
            .create_session("app", "u", Some("s"), SharedState::new())
            .await
            .unwrap_err();
        assert!(matches!(error, SessionStoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_state_and_events_are_kept() {
        let store = InMemorySessionStore::new();
        let session = store
            .create_session("app", "u", Some("s"), SharedState::new())
            .await
            .unwrap();

        let mut state = SharedState::new();
        state.insert(StateKey::new(keys::USER_NAME).unwrap(), "Mats");
        store.update_state(&session.key, &state).await.unwrap();
        store
            .append_event(&session.key, &RunEvent::user_message("hi"))
            .await
            .unwrap();

        let loaded = store.get_session(&session.key).await.unwrap().unwrap();
        assert_eq!(loaded.state.get_str(keys::USER_NAME), Some("Mats"));
        assert_eq!(loaded.events, vec![RunEvent::user_message("hi")]);
    }

    #[tokio::test]
    async fn test_missing_session_operations() {
        let store = InMemorySessionStore::new();
        let key = SessionKey::new("app", "u", "ghost");
        assert!(store.get_session(&key).await.unwrap().is_none());
        assert!(matches!(
            store.update_state(&key, &SharedState::new()).await,
            Err(SessionStoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_session(&key).await,
            Err(SessionStoreError::NotFound(_))
        ));
    }
}
