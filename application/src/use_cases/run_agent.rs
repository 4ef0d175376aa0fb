//! Run Agent use case
//!
//! Runs one stage tree as a single session turn: load the session, record
//! the user message, run the tree against the session's Shared State, and
//! persist state and events. The final response is the last persona output.

use super::run_context::RunContext;
use super::run_stage::{StageError, StageRunner};
use crate::ports::completion::CompletionService;
use crate::ports::session_store::{SessionStore, SessionStoreError};
use std::collections::BTreeSet;
use std::sync::Arc;
use think_tank_domain::{
    CompositionError, RunEvent, Session, SessionKey, SharedState, Stage, StageOutcome, StateKey,
};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while running a session turn
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionKey),

    #[error("Session store error: {0}")]
    Session(#[from] SessionStoreError),

    #[error("Invalid agent tree: {0}")]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Input for [`AgentRunner::execute`]
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    pub session: SessionKey,
    /// The user's message for this turn
    pub message: String,
}

impl RunAgentInput {
    pub fn new(session: SessionKey, message: impl Into<String>) -> Self {
        Self {
            session,
            message: message.into(),
        }
    }
}

/// Result of one session turn
#[derive(Debug, Clone)]
pub struct RunAgentOutput {
    pub session: SessionKey,
    pub outcome: StageOutcome,
    /// Events recorded during this turn, in order
    pub events: Vec<RunEvent>,
    pub final_response: Option<String>,
}

/// Use case for running an agent tree inside a stored session
pub struct AgentRunner<C: CompletionService + 'static, S: SessionStore + 'static> {
    stages: StageRunner<C>,
    sessions: Arc<S>,
}

impl<C: CompletionService + 'static, S: SessionStore + 'static> Clone for AgentRunner<C, S> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<C: CompletionService + 'static, S: SessionStore + 'static> AgentRunner<C, S> {
    pub fn new(stages: StageRunner<C>, sessions: Arc<S>) -> Self {
        Self { stages, sessions }
    }

    pub fn sessions(&self) -> &Arc<S> {
        &self.sessions
    }

    /// Run `stage` for one user message.
    ///
    /// State and events are persisted even when the run fails, so the
    /// session keeps everything written before the failing stage.
    pub async fn execute(
        &self,
        stage: &Stage,
        input: RunAgentInput,
        ctx: &RunContext,
    ) -> Result<RunAgentOutput, RunAgentError> {
        let session = self.load(&input.session).await?;
        stage.validate(&available_keys(&session.state))?;

        info!("Running {} for session {}", stage.name(), session.key);
        let mut state = session.state;
        ctx.emit(RunEvent::user_message(&input.message));

        let result = self
            .stages
            .run(stage, &mut state, &input.message, ctx)
            .await;

        let final_response = match &result {
            Ok(outcome) => outcome.output.as_ref().map(|output| {
                let content = output.result.as_text();
                ctx.emit(RunEvent::final_response(&output.author, &content));
                content
            }),
            Err(error) => {
                warn!("Run of {} failed: {}", stage.name(), error);
                None
            }
        };

        let events = ctx.drain_events();
        persist(self.sessions.as_ref(), &input.session, &state, &events).await?;

        Ok(RunAgentOutput {
            session: input.session,
            outcome: result?,
            events,
            final_response,
        })
    }

    async fn load(&self, key: &SessionKey) -> Result<Session, RunAgentError> {
        self.sessions
            .get_session(key)
            .await?
            .ok_or_else(|| RunAgentError::SessionNotFound(key.clone()))
    }
}

/// Keys present in `state`, the starting point for tree validation
pub(crate) fn available_keys(state: &SharedState) -> BTreeSet<StateKey> {
    state.keys().cloned().collect()
}

/// Store the state and append the events of one turn
pub(crate) async fn persist<S: SessionStore + ?Sized>(
    sessions: &S,
    key: &SessionKey,
    state: &SharedState,
    events: &[RunEvent],
) -> Result<(), SessionStoreError> {
    sessions.update_state(key, state).await?;
    for event in events {
        sessions.append_event(key, event).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::testing::{FakeSessionStore, ScriptedCompletion};
    use crate::use_cases::invoke_persona::PersonaInvoker;
    use think_tank_domain::{
        AgentCatalog, ParallelGroup, PersonaDescriptor, SequentialPipeline, keys,
    };

    fn key(name: &str) -> StateKey {
        StateKey::new(name).unwrap()
    }

    fn runner(
        completion: ScriptedCompletion,
    ) -> AgentRunner<ScriptedCompletion, FakeSessionStore> {
        let invoker = PersonaInvoker::new(Arc::new(completion), RuntimeConfig::default());
        AgentRunner::new(StageRunner::new(invoker), Arc::new(FakeSessionStore::default()))
    }

    async fn create(
        runner: &AgentRunner<ScriptedCompletion, FakeSessionStore>,
        state: SharedState,
    ) -> SessionKey {
        runner
            .sessions()
            .create_session("think_tank", "user", None, state)
            .await
            .unwrap()
            .key
    }

    // ==================== Execution ====================

    #[tokio::test]
    async fn test_email_writer_turn_persists_state_and_events() {
        let reply = r#"{"date": "2025-05-14", "from_address": "mats@oldin.se", "to_address": "jessica@oldin.se", "subject": "Hi", "body": "Hello"}"#;
        let runner = runner(ScriptedCompletion::new().reply("email_writer", reply));
        let session = create(
            &runner,
            SharedState::seeded([
                (key(keys::USER_EMAIL), "mats@oldin.se"),
                (key(keys::TODAYS_DATE), "2025-05-14"),
            ]),
        )
        .await;
        let stage: Stage = AgentCatalog::default().email_writer().unwrap().into();

        let output = runner
            .execute(
                &stage,
                RunAgentInput::new(session.clone(), "Mail jessica@oldin.se"),
                &RunContext::detached(),
            )
            .await
            .unwrap();

        assert!(output.final_response.unwrap().contains("mats@oldin.se"));
        assert!(output.events.last().unwrap().is_final_response());
        assert!(matches!(output.events[0], RunEvent::UserMessage { .. }));

        let stored = runner.sessions().get_session(&session).await.unwrap().unwrap();
        assert!(stored.state.contains(keys::EMAIL));
        assert_eq!(stored.events.len(), output.events.len());
        assert!(stored.final_response().is_some());
    }

    #[tokio::test]
    async fn test_missing_session() {
        let runner = runner(ScriptedCompletion::new());
        let stage: Stage = PersonaDescriptor::new("p", "").unwrap().into();

        let error = runner
            .execute(
                &stage,
                RunAgentInput::new(SessionKey::new("a", "u", "nope"), "hi"),
                &RunContext::detached(),
            )
            .await
            .unwrap_err();

        assert!(matches!(error, RunAgentError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_placeholder_rejected_before_any_call() {
        let runner = runner(ScriptedCompletion::new());
        let session = create(&runner, SharedState::new()).await;
        let stage: Stage = PersonaDescriptor::new("p", "Use {user_email}").unwrap().into();

        let error = runner
            .execute(&stage, RunAgentInput::new(session, "hi"), &RunContext::detached())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RunAgentError::Composition(CompositionError::UnknownPlaceholder { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_run_keeps_earlier_writes() {
        let runner = runner(ScriptedCompletion::new().fail("second", "down"));
        let session = create(&runner, SharedState::new()).await;
        let pipeline = SequentialPipeline::new(
            "p",
            vec![
                PersonaDescriptor::new("first", "")
                    .unwrap()
                    .with_output_key(key("first_output"))
                    .into(),
                PersonaDescriptor::new("second", "")
                    .unwrap()
                    .with_output_key(key("second_output"))
                    .into(),
            ],
        )
        .unwrap();

        let error = runner
            .execute(
                &pipeline.into(),
                RunAgentInput::new(session.clone(), "go"),
                &RunContext::detached(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RunAgentError::Stage(StageError::StageFailed { index: 1, .. })
        ));
        let stored = runner.sessions().get_session(&session).await.unwrap().unwrap();
        assert_eq!(stored.state.get_str("first_output"), Some("first output"));
        assert!(stored.final_response().is_none());
    }

    #[tokio::test]
    async fn test_group_only_tree_has_no_final_response() {
        let runner = runner(ScriptedCompletion::new());
        let session = create(&runner, SharedState::new()).await;
        let group = ParallelGroup::new(
            "g",
            vec![
                PersonaDescriptor::new("a", "")
                    .unwrap()
                    .with_output_key(key("a_output")),
            ],
        )
        .unwrap();

        let output = runner
            .execute(&group.into(), RunAgentInput::new(session, "go"), &RunContext::detached())
            .await
            .unwrap();

        assert!(output.final_response.is_none());
        assert_eq!(output.outcome.groups.len(), 1);
        assert!(output.outcome.output.is_none());
    }
}
