//! Run Think Tank use case (Root Coordinator)
//!
//! Drives the think tank flow around a human-in-the-loop suspension:
//!
//! 1. [`clarify`](ThinkTankCoordinator::clarify) stores the request, runs the
//!    clarification persona and returns its questions. The session is saved
//!    and nothing is held while the user answers.
//! 2. [`resume`](ThinkTankCoordinator::resume) folds the answers into a
//!    refined request, runs the persona group and the synthesizer, and stores
//!    the report under `final_report`.
//!
//! [`run`](ThinkTankCoordinator::run) chains both calls through a
//! [`ClarificationResponder`].

use super::run_agent::persist;
use super::run_context::RunContext;
use super::run_stage::{StageError, StageRunner};
use crate::ports::clarification::{ClarificationError, ClarificationResponder};
use crate::ports::completion::CompletionService;
use crate::ports::session_store::{SessionStore, SessionStoreError};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use think_tank_domain::catalog::think_tank::SYNTHESIZER_AGENT;
use think_tank_domain::{
    ClarificationExchange, CompositionError, GroupReport, RunEvent, Session, SessionKey,
    SharedState, Stage, StateKey, ThinkTank, compose_refined_request, keys, pair_answers,
    parse_questions,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionKey),

    #[error("Session {0} has no pending clarification; call clarify first")]
    NotClarified(SessionKey),

    #[error("Session store error: {0}")]
    Session(#[from] SessionStoreError),

    #[error("Invalid think tank: {0}")]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("Clarification failed: {0}")]
    Clarification(#[from] ClarificationError),
}

/// Input for [`ThinkTankCoordinator::run`]
#[derive(Debug, Clone)]
pub struct ThinkTankInput {
    pub session: SessionKey,
    pub request: String,
    /// Ask clarification questions before the personas run
    pub clarify: bool,
}

impl ThinkTankInput {
    pub fn new(session: SessionKey, request: impl Into<String>) -> Self {
        Self {
            session,
            request: request.into(),
            clarify: true,
        }
    }

    pub fn without_clarification(mut self) -> Self {
        self.clarify = false;
        self
    }
}

/// Result of the first call: the questions awaiting answers
#[derive(Debug, Clone)]
pub struct PendingClarification {
    pub session: SessionKey,
    pub questions: Vec<String>,
    pub events: Vec<RunEvent>,
}

/// Result of a completed think tank run
#[derive(Debug, Clone)]
pub struct ThinkTankReport {
    pub session: SessionKey,
    /// Request plus the answered questions, as handed to the personas
    pub refined_request: String,
    pub exchanges: Vec<ClarificationExchange>,
    /// `(persona id, output)` for every persona that produced one, in roster order
    pub persona_outputs: Vec<(String, String)>,
    pub report: String,
    pub groups: Vec<GroupReport>,
    pub events: Vec<RunEvent>,
}

impl ThinkTankReport {
    pub fn is_partial(&self) -> bool {
        self.groups.iter().any(GroupReport::is_partial)
    }
}

/// Root Coordinator for the think tank
pub struct ThinkTankCoordinator<C: CompletionService + 'static, S: SessionStore + 'static> {
    stages: StageRunner<C>,
    sessions: Arc<S>,
    think_tank: ThinkTank,
}

impl<C: CompletionService + 'static, S: SessionStore + 'static> ThinkTankCoordinator<C, S> {
    pub fn new(stages: StageRunner<C>, sessions: Arc<S>, think_tank: ThinkTank) -> Self {
        Self {
            stages,
            sessions,
            think_tank,
        }
    }

    pub fn think_tank(&self) -> &ThinkTank {
        &self.think_tank
    }

    /// Store `request` and run the clarification persona.
    ///
    /// Returns the parsed questions, which are also kept in the session
    /// under `clarification_questions` for [`resume`](Self::resume).
    pub async fn clarify(
        &self,
        session: &SessionKey,
        request: &str,
        ctx: &RunContext,
    ) -> Result<PendingClarification, CoordinatorError> {
        let mut state = self.load(session).await?.state;
        self.clear_run_outputs(&mut state)?;
        self.think_tank.validate(&self.seed_keys(&state)?)?;

        info!("Clarifying request for session {}", session);
        ctx.emit(RunEvent::user_message(request));
        state.insert(StateKey::new(keys::USER_REQUEST)?, request.trim());

        let clarification = Stage::Persona(self.think_tank.clarification.clone());
        let result = self.stages.run(&clarification, &mut state, request, ctx).await;

        let questions = match &result {
            Ok(outcome) => {
                let raw = outcome
                    .output
                    .as_ref()
                    .map(|output| output.result.as_text())
                    .unwrap_or_default();
                let questions = parse_questions(&raw);
                state.insert(
                    StateKey::new(keys::CLARIFICATION_QUESTIONS)?,
                    json!(questions),
                );
                ctx.emit(RunEvent::ClarificationRequested {
                    questions: questions.clone(),
                });
                questions
            }
            Err(error) => {
                warn!("Clarification failed for session {}: {}", session, error);
                Vec::new()
            }
        };

        let events = ctx.drain_events();
        persist(self.sessions.as_ref(), session, &state, &events).await?;
        result?;

        Ok(PendingClarification {
            session: session.clone(),
            questions,
            events,
        })
    }

    /// Answer the pending questions and run the personas and synthesizer.
    ///
    /// Answers pair with questions by position; missing answers leave the
    /// question out of the refined request.
    pub async fn resume(
        &self,
        session: &SessionKey,
        answers: &[String],
        ctx: &RunContext,
    ) -> Result<ThinkTankReport, CoordinatorError> {
        let mut state = self.load(session).await?.state;
        let (request, questions) = pending(&state)
            .ok_or_else(|| CoordinatorError::NotClarified(session.clone()))?;
        self.think_tank.validate(&self.seed_keys(&state)?)?;

        let exchanges = pair_answers(&questions, answers);
        let refined_request = compose_refined_request(&request, &exchanges);
        state.insert(
            StateKey::new(keys::CLARIFICATION_ANSWERS)?,
            Value::Array(
                exchanges
                    .iter()
                    .map(|e| json!({"question": e.question, "answer": e.answer}))
                    .collect(),
            ),
        );

        info!(
            "Resuming session {} with {} of {} questions answered",
            session,
            exchanges.iter().filter(|e| e.is_answered()).count(),
            exchanges.len()
        );
        ctx.emit(RunEvent::user_message(&refined_request));

        let result = self
            .stages
            .run(&self.think_tank.facilitator, &mut state, &refined_request, ctx)
            .await;

        let report = match &result {
            Ok(_) => {
                let report = state
                    .render_value(keys::SYNTHESIS_OUTPUT)
                    .unwrap_or_default();
                state.insert(StateKey::new(keys::FINAL_REPORT)?, report.as_str());
                ctx.emit(RunEvent::final_response(SYNTHESIZER_AGENT, &report));
                report
            }
            Err(error) => {
                warn!("Think tank run failed for session {}: {}", session, error);
                String::new()
            }
        };

        let events = ctx.drain_events();
        persist(self.sessions.as_ref(), session, &state, &events).await?;
        let outcome = result?;

        let persona_outputs = self
            .think_tank
            .roster
            .iter()
            .filter_map(|persona| {
                state
                    .render_value(&persona.output_key())
                    .map(|output| (persona.id().to_string(), output))
            })
            .collect();

        Ok(ThinkTankReport {
            session: session.clone(),
            refined_request,
            exchanges,
            persona_outputs,
            report,
            groups: outcome.groups,
            events,
        })
    }

    /// Run the whole flow, asking `responder` to answer the questions.
    ///
    /// Cancelling the run while the responder waits ends it with
    /// [`ClarificationError::Cancelled`].
    pub async fn run(
        &self,
        input: ThinkTankInput,
        responder: &dyn ClarificationResponder,
        ctx: &RunContext,
    ) -> Result<ThinkTankReport, CoordinatorError> {
        let (questions, mut events) = if input.clarify {
            let pending = self.clarify(&input.session, &input.request, ctx).await?;
            (pending.questions, pending.events)
        } else {
            self.skip_clarification(&input.session, &input.request, ctx)
                .await?;
            (Vec::new(), ctx.drain_events())
        };

        let answers = if questions.is_empty() {
            Vec::new()
        } else {
            tokio::select! {
                biased;
                _ = ctx.cancel_token().cancelled() => {
                    return Err(ClarificationError::Cancelled.into());
                }
                answers = responder.answer(&questions) => answers?,
            }
        };

        let mut report = self.resume(&input.session, &answers, ctx).await?;
        events.append(&mut report.events);
        report.events = events;
        Ok(report)
    }

    /// Store the request with an empty question list so `resume` can run
    async fn skip_clarification(
        &self,
        session: &SessionKey,
        request: &str,
        ctx: &RunContext,
    ) -> Result<(), CoordinatorError> {
        let mut state = self.load(session).await?.state;
        self.clear_run_outputs(&mut state)?;
        ctx.emit(RunEvent::user_message(request));
        state.insert(StateKey::new(keys::USER_REQUEST)?, request.trim());
        state.insert(
            StateKey::new(keys::CLARIFICATION_QUESTIONS)?,
            Value::Array(Vec::new()),
        );
        let events = ctx.drain_events();
        persist(self.sessions.as_ref(), session, &state, &events).await?;
        Ok(())
    }

    async fn load(&self, key: &SessionKey) -> Result<Session, CoordinatorError> {
        self.sessions
            .get_session(key)
            .await?
            .ok_or_else(|| CoordinatorError::SessionNotFound(key.clone()))
    }

    /// Keys the think tank writes during one request
    fn written_keys(&self) -> Result<BTreeSet<StateKey>, CompositionError> {
        let mut written: BTreeSet<StateKey> = [
            keys::USER_REQUEST,
            keys::CLARIFICATION_QUESTIONS,
            keys::CLARIFICATION_ANSWERS,
            keys::FINAL_REPORT,
        ]
        .into_iter()
        .map(StateKey::new)
        .collect::<Result<_, _>>()?;
        if let Some(key) = self.think_tank.clarification.output_key() {
            written.insert(key.clone());
        }
        written.extend(self.think_tank.facilitator.output_keys().into_iter().cloned());
        Ok(written)
    }

    /// Drop the outputs of an earlier request on this session, so no stage
    /// reads a value it did not produce in this run
    fn clear_run_outputs(&self, state: &mut SharedState) -> Result<(), CompositionError> {
        for key in self.written_keys()? {
            if state.remove(key.as_str()).is_some() {
                debug!("Cleared {} from the previous request", key);
            }
        }
        Ok(())
    }

    /// Keys of `state` that the think tank itself does not write, so a
    /// session can be run again
    fn seed_keys(&self, state: &SharedState) -> Result<BTreeSet<StateKey>, CompositionError> {
        let written = self.written_keys()?;
        Ok(state
            .keys()
            .filter(|key| !written.contains(*key))
            .cloned()
            .collect())
    }
}

/// The stored request and questions of a clarified session
fn pending(state: &SharedState) -> Option<(String, Vec<String>)> {
    let request = state.get_str(keys::USER_REQUEST)?.to_string();
    let questions = match state.get(keys::CLARIFICATION_QUESTIONS)? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(raw) => parse_questions(raw),
        _ => Vec::new(),
    };
    Some((request, questions))
}
