//! Session domain entities

use super::events::RunEvent;
use crate::state::shared_state::SharedState;
use serde::{Deserialize, Serialize};

/// Identity of one stored session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A user session: its Shared State and the events recorded so far (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    pub state: SharedState,
    #[serde(default)]
    pub events: Vec<RunEvent>,
    /// Unix epoch milliseconds of the last change
    pub last_update_ms: i64,
}

impl Session {
    pub fn new(key: SessionKey, state: SharedState, now_ms: i64) -> Self {
        Self {
            key,
            state,
            events: Vec::new(),
            last_update_ms: now_ms,
        }
    }

    pub fn id(&self) -> &str {
        &self.key.session_id
    }

    /// The last final response recorded in this session
    pub fn final_response(&self) -> Option<&RunEvent> {
        self.events.iter().rev().find(|e| e.is_final_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_display() {
        let key = SessionKey::new("think_tank", "matsoldin", "abc");
        assert_eq!(key.to_string(), "think_tank/matsoldin/abc");
    }

    #[test]
    fn test_final_response_picks_latest() {
        let mut session = Session::new(
            SessionKey::new("app", "user", "s1"),
            SharedState::new(),
            0,
        );
        assert!(session.final_response().is_none());
        session.events.push(RunEvent::final_response("a", "first"));
        session.events.push(RunEvent::user_message("again"));
        session.events.push(RunEvent::final_response("b", "second"));
        match session.final_response() {
            Some(RunEvent::FinalResponse { content, .. }) => assert_eq!(content, "second"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
