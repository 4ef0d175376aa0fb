//! Test doubles for the ports, shared by the use case tests.

use crate::ports::artifact_store::{ArtifactStore, ArtifactStoreError};
use crate::ports::completion::{Completion, CompletionError, CompletionRequest, CompletionService};
use crate::ports::document_renderer::{DocumentRenderer, RenderError, ReportDocument};
use crate::ports::session_store::{SessionStore, SessionStoreError, SessionSummary};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use think_tank_domain::{Artifact, ArtifactRef, RunEvent, Session, SessionKey, SharedState};

/// Completion service answering from per-agent scripts.
///
/// Agents without a script answer `"<agent> output"`.
#[derive(Default)]
pub struct ScriptedCompletion {
    scripts: Mutex<HashMap<String, VecDeque<Result<Completion, CompletionError>>>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, agent: &str, text: &str) -> Self {
        self.push(agent, Ok(Completion::Text(text.to_string())))
    }

    pub fn push(self, agent: &str, result: Result<Completion, CompletionError>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(agent.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn fail(self, agent: &str, message: &str) -> Self {
        self.push(agent, Err(CompletionError::RequestFailed(message.to_string())))
    }

    pub fn delay(self, agent: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(agent.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_for(&self, agent: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.agent == agent)
            .count()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self.delays.lock().unwrap().get(&request.agent).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&request.agent)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(Completion::Text(format!("{} output", request.agent))))
    }
}

/// Session store kept in a map
#[derive(Default)]
pub struct FakeSessionStore {
    sessions: Mutex<BTreeMap<SessionKey, Session>>,
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
        initial_state: SharedState,
    ) -> Result<Session, SessionStoreError> {
        let key = SessionKey::new(app_name, user_id, session_id.unwrap_or("session-1"));
        let session = Session::new(key.clone(), initial_state, 0);
        self.sessions.lock().unwrap().insert(key, session.clone());
        Ok(session)
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.lock().unwrap().get(key).cloned())
    }

    async fn update_state(
        &self,
        key: &SessionKey,
        state: &SharedState,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))?;
        session.state = state.clone();
        Ok(())
    }

    async fn append_event(
        &self,
        key: &SessionKey,
        event: &RunEvent,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))?;
        session.events.push(event.clone());
        Ok(())
    }

    async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, SessionStoreError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
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
        self.sessions.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Artifact store kept in a map of version lists
#[derive(Default)]
pub struct FakeArtifactStore {
    artifacts: Mutex<HashMap<String, Vec<(String, Vec<u8>)>>>,
}

#[async_trait]
impl ArtifactStore for FakeArtifactStore {
    async fn save(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ArtifactRef, ArtifactStoreError> {
        let mut artifacts = self.artifacts.lock().unwrap();
        let versions = artifacts.entry(name.to_string()).or_default();
        versions.push((mime_type.to_string(), bytes));
        Ok(ArtifactRef::new(name, versions.len() as u32))
    }

    async fn load(&self, reference: &ArtifactRef) -> Result<Option<Artifact>, ArtifactStoreError> {
        let artifacts = self.artifacts.lock().unwrap();
        let Some(versions) = artifacts.get(&reference.name) else {
            return Ok(None);
        };
        let version = reference.version.unwrap_or(versions.len() as u32);
        Ok(version
            .checked_sub(1)
            .and_then(|i| versions.get(i as usize))
            .map(|(mime_type, bytes)| Artifact {
                reference: ArtifactRef::new(reference.name.clone(), version),
                mime_type: mime_type.clone(),
                bytes: bytes.clone(),
            }))
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<u32>, ArtifactStoreError> {
        let artifacts = self.artifacts.lock().unwrap();
        Ok(artifacts
            .get(name)
            .map(|v| (1..=v.len() as u32).collect())
            .unwrap_or_default())
    }
}

/// Renderer producing `%PDF-fake` followed by the title and markdown
pub struct FakeRenderer;

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        if document.markdown.contains("<<broken>>") {
            return Err(RenderError::ConversionFailed("unbalanced markup".to_string()));
        }
        Ok(format!("%PDF-fake\n{}\n{}", document.title, document.markdown).into_bytes())
    }

    fn mime_type(&self) -> &'static str {
        think_tank_domain::artifact::PDF_MIME
    }
}
