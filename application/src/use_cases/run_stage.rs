//! Run Stage use case
//!
//! Executes a stage tree: personas one at a time, parallel groups as a
//! fan-out over one state snapshot, sequential pipelines in order.

use super::invoke_persona::{PersonaInvoker, write_output};
use super::run_context::RunContext;
use crate::ports::completion::{CompletionError, CompletionService};
use futures::future::BoxFuture;
use std::sync::Arc;
use think_tank_domain::{
    FailurePolicy, GroupReport, InvocationResult, MemberFailure, ParallelGroup, PersonaDescriptor,
    RunEvent, SchemaError, SequentialPipeline, SharedState, Stage, StageOutcome, StageOutput,
};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors that can occur while running a stage tree
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Persona '{persona}' completion failed: {source}")]
    Completion {
        persona: String,
        #[source]
        source: CompletionError,
    },

    #[error("Persona '{persona}' output does not match schema '{schema}': {source}")]
    SchemaViolation {
        persona: String,
        schema: String,
        #[source]
        source: SchemaError,
    },

    #[error("Persona '{persona}' exceeded {limit} tool rounds")]
    ToolLoopExceeded { persona: String, limit: usize },

    #[error("Persona '{persona}' declares tools the configured tool handler cannot dispatch")]
    ToolsUnavailable { persona: String },

    #[error("Parallel group '{group}' failed on member '{member}': {source}")]
    GroupFailed {
        group: String,
        member: String,
        #[source]
        source: Box<StageError>,
    },

    #[error("All {} members of parallel group '{group}' failed", failures.len())]
    AllMembersFailed {
        group: String,
        failures: Vec<MemberFailure>,
    },

    /// Stage `index` (zero-based) of `pipeline` failed; later stages never ran
    #[error("Pipeline '{pipeline}' failed at stage {index} ('{stage}'): {source}")]
    StageFailed {
        pipeline: String,
        index: usize,
        stage: String,
        #[source]
        source: Box<StageError>,
    },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Task join error: {0}")]
    Join(String),
}

impl StageError {
    /// The innermost error, looking through group and pipeline wrappers
    pub fn root_cause(&self) -> &StageError {
        match self {
            StageError::GroupFailed { source, .. } | StageError::StageFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), StageError::Cancelled)
    }
}

/// Use case for running a stage tree against Shared State
pub struct StageRunner<C: CompletionService + 'static> {
    invoker: PersonaInvoker<C>,
}

impl<C: CompletionService + 'static> Clone for StageRunner<C> {
    fn clone(&self) -> Self {
        Self {
            invoker: self.invoker.clone(),
        }
    }
}

impl<C: CompletionService + 'static> StageRunner<C> {
    pub fn new(invoker: PersonaInvoker<C>) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &PersonaInvoker<C> {
        &self.invoker
    }

    /// Run `stage`, reading and extending `state`.
    ///
    /// On failure `state` keeps every write made before the failing stage.
    pub async fn run(
        &self,
        stage: &Stage,
        state: &mut SharedState,
        user_input: &str,
        ctx: &RunContext,
    ) -> Result<StageOutcome, StageError> {
        self.run_boxed(stage, state, user_input, ctx).await
    }

    fn run_boxed<'a>(
        &'a self,
        stage: &'a Stage,
        state: &'a mut SharedState,
        user_input: &'a str,
        ctx: &'a RunContext,
    ) -> BoxFuture<'a, Result<StageOutcome, StageError>> {
        Box::pin(async move {
            if ctx.is_cancelled() {
                return Err(StageError::Cancelled);
            }

            let personas = stage.personas().len();
            info!("Stage {} ({}) starting", stage.name(), stage.kind());
            ctx.progress()
                .on_stage_start(stage.name(), stage.kind(), personas);
            ctx.emit(RunEvent::StageStarted {
                stage: stage.name().to_string(),
                kind: stage.kind(),
            });

            let outcome = match stage {
                Stage::Persona(persona) => self.run_persona(persona, state, user_input, ctx).await,
                Stage::Parallel(group) => self.run_parallel(group, state, user_input, ctx).await,
                Stage::Sequential(pipeline) => {
                    self.run_sequential(pipeline, state, user_input, ctx).await
                }
            }?;

            ctx.progress().on_stage_complete(stage.name(), stage.kind());
            Ok(outcome)
        })
    }

    async fn run_persona(
        &self,
        persona: &PersonaDescriptor,
        state: &mut SharedState,
        user_input: &str,
        ctx: &RunContext,
    ) -> Result<StageOutcome, StageError> {
        let result = self.invoker.invoke(persona, state, user_input, ctx).await;
        ctx.progress()
            .on_persona_complete(persona.name(), result.is_ok());
        Ok(StageOutcome::from_output(StageOutput::new(
            persona.name(),
            result?,
        )))
    }

    /// Fan out over one snapshot; apply writes in member order after fan-in.
    async fn run_parallel(
        &self,
        group: &ParallelGroup,
        state: &mut SharedState,
        user_input: &str,
        ctx: &RunContext,
    ) -> Result<StageOutcome, StageError> {
        let config = self.invoker.config();
        let members = group.members();
        let snapshot = Arc::new(state.clone());
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let policy = config.failure_policy;

        let mut join_set = JoinSet::new();
        for (index, member) in members.iter().enumerate() {
            let invoker = self.invoker.clone();
            let member = member.clone();
            let snapshot = Arc::clone(&snapshot);
            let semaphore = Arc::clone(&semaphore);
            let user_input = user_input.to_string();
            let ctx = ctx.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = invoker.produce(&member, &snapshot, &user_input, &ctx).await;
                (index, result)
            });
        }

        let mut results: Vec<Option<InvocationResult>> = vec![None; members.len()];
        let mut failures: Vec<(usize, MemberFailure)> = Vec::new();

        loop {
            let joined = tokio::select! {
                biased;
                _ = ctx.cancel_token().cancelled() => {
                    join_set.abort_all();
                    warn!("Group {} cancelled; outstanding members aborted", group.name());
                    return Err(StageError::Cancelled);
                }
                joined = join_set.join_next() => joined,
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, Ok(result))) => {
                    let member = &members[index];
                    debug!("Member {} of {} completed", member.name(), group.name());
                    ctx.progress().on_persona_complete(member.name(), true);
                    results[index] = Some(result);
                }
                Ok((index, Err(error))) => {
                    let member = &members[index];
                    ctx.progress().on_persona_complete(member.name(), false);
                    match policy {
                        FailurePolicy::FailFast => {
                            join_set.abort_all();
                            warn!(
                                "Member {} of {} failed, aborting group: {}",
                                member.name(),
                                group.name(),
                                error
                            );
                            return Err(StageError::GroupFailed {
                                group: group.name().to_string(),
                                member: member.name().to_string(),
                                source: Box::new(error),
                            });
                        }
                        FailurePolicy::BestEffort => {
                            warn!(
                                "Member {} of {} failed, continuing: {}",
                                member.name(),
                                group.name(),
                                error
                            );
                            let failure = MemberFailure {
                                member: member.name().to_string(),
                                error: error.to_string(),
                            };
                            ctx.emit(RunEvent::MemberFailed {
                                member: failure.member.clone(),
                                error: failure.error.clone(),
                            });
                            failures.push((index, failure));
                        }
                    }
                }
                Err(join_error) => {
                    join_set.abort_all();
                    return Err(StageError::Join(join_error.to_string()));
                }
            }
        }

        failures.sort_by_key(|(index, _)| *index);
        let failures: Vec<MemberFailure> = failures.into_iter().map(|(_, f)| f).collect();
        if failures.len() == members.len() {
            return Err(StageError::AllMembersFailed {
                group: group.name().to_string(),
                failures,
            });
        }

        let mut report = GroupReport::new(group.name());
        for (member, result) in members.iter().zip(results) {
            if let Some(result) = result {
                write_output(member, &result, state, ctx);
                report.completed.push(member.name().to_string());
            }
        }
        report.failures = failures;

        info!(
            "Group {} finished: {} completed, {} failed",
            group.name(),
            report.completed.len(),
            report.failures.len()
        );
        Ok(StageOutcome::from_group(report))
    }

    async fn run_sequential(
        &self,
        pipeline: &SequentialPipeline,
        state: &mut SharedState,
        user_input: &str,
        ctx: &RunContext,
    ) -> Result<StageOutcome, StageError> {
        let mut outcome = StageOutcome::default();
        for (index, stage) in pipeline.stages().iter().enumerate() {
            match self.run_boxed(stage, state, user_input, ctx).await {
                Ok(stage_outcome) => outcome.merge(stage_outcome),
                Err(error) => {
                    warn!(
                        "Pipeline {} stopped at stage {} ({})",
                        pipeline.name(),
                        index,
                        stage.name()
                    );
                    return Err(StageError::StageFailed {
                        pipeline: pipeline.name().to_string(),
                        index,
                        stage: stage.name().to_string(),
                        source: Box::new(error),
                    });
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::testing::ScriptedCompletion;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use think_tank_domain::StateKey;

    fn key(name: &str) -> StateKey {
        StateKey::new(name).unwrap()
    }

    fn persona(name: &str, instruction: &str) -> PersonaDescriptor {
        PersonaDescriptor::new(name, instruction)
            .unwrap()
            .with_output_key(key(&format!("{}_output", name)))
    }

    fn runner(
        completion: ScriptedCompletion,
        config: RuntimeConfig,
    ) -> (StageRunner<ScriptedCompletion>, Arc<ScriptedCompletion>) {
        let completion = Arc::new(completion);
        let invoker = PersonaInvoker::new(Arc::clone(&completion), config);
        (StageRunner::new(invoker), completion)
    }

    fn five_persona_group() -> ParallelGroup {
        let members = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| persona(name, "Analyse"))
            .collect();
        ParallelGroup::new("panel", members).unwrap()
    }

    // ==================== Sequential ====================

    #[tokio::test]
    async fn test_sequential_threads_state_forward() {
        let (runner, completion) = runner(
            ScriptedCompletion::new()
                .reply("first", "one")
                .reply("second", "two"),
            RuntimeConfig::default(),
        );
        let pipeline = SequentialPipeline::new(
            "p",
            vec![
                persona("first", "Start").into(),
                persona("second", "Continue from {first_output}").into(),
            ],
        )
        .unwrap();
        let mut state = SharedState::new();

        let outcome = runner
            .run(&pipeline.into(), &mut state, "go", &RunContext::detached())
            .await
            .unwrap();

        assert_eq!(outcome.output.unwrap().result.as_text(), "two");
        assert_eq!(
            completion.requests()[1].instruction,
            "Continue from one"
        );
        assert_eq!(state.get_str("second_output"), Some("two"));
    }

    #[tokio::test]
    async fn test_sequential_failure_stops_later_stages() {
        let (runner, completion) = runner(
            ScriptedCompletion::new().fail("s2", "service unavailable"),
            RuntimeConfig::default(),
        );
        let pipeline = SequentialPipeline::new(
            "p",
            vec![
                persona("s1", "One").into(),
                persona("s2", "Two").into(),
                persona("s3", "Three").into(),
            ],
        )
        .unwrap();
        let mut state = SharedState::new();

        let error = runner
            .run(&pipeline.into(), &mut state, "", &RunContext::detached())
            .await
            .unwrap_err();

        match &error {
            StageError::StageFailed { index, stage, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(stage, "s2");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(error.root_cause(), StageError::Completion { .. }));
        assert_eq!(completion.calls_for("s3"), 0);
        assert!(state.contains("s1_output"));
        assert!(!state.contains("s3_output"));
    }

    #[tokio::test]
    async fn test_nested_pipeline_failure_reports_both_levels() {
        let (runner, _) = runner(
            ScriptedCompletion::new().fail("inner_b", "boom"),
            RuntimeConfig::default(),
        );
        let inner = SequentialPipeline::new(
            "inner",
            vec![persona("inner_a", "").into(), persona("inner_b", "").into()],
        )
        .unwrap();
        let outer =
            SequentialPipeline::new("outer", vec![persona("head", "").into(), inner.into()])
                .unwrap();

        let error = runner
            .run(&outer.into(), &mut SharedState::new(), "", &RunContext::detached())
            .await
            .unwrap_err();

        match error {
            StageError::StageFailed {
                index: 1, source, ..
            } => assert!(matches!(*source, StageError::StageFailed { index: 1, .. })),
            other => panic!("unexpected error {:?}", other),
        }
    }

    // ==================== Parallel ====================

    #[tokio::test]
    async fn test_parallel_group_writes_one_key_per_member() {
        let (runner, _) = runner(ScriptedCompletion::new(), RuntimeConfig::default());
        let group = five_persona_group();
        let mut state = SharedState::new();

        let outcome = runner
            .run(&group.into(), &mut state, "problem", &RunContext::detached())
            .await
            .unwrap();

        let expected: BTreeSet<&str> =
            ["a_output", "b_output", "c_output", "d_output", "e_output"].into();
        let actual: BTreeSet<&str> = state.keys().map(|k| k.as_str()).collect();
        assert_eq!(actual, expected);
        for name in ["a", "b", "c", "d", "e"] {
            assert_eq!(
                state.get_str(&format!("{}_output", name)),
                Some(format!("{} output", name).as_str())
            );
        }
        assert_eq!(outcome.groups[0].completed, vec!["a", "b", "c", "d", "e"]);
        assert!(outcome.output.is_none());
    }

    #[tokio::test]
    async fn test_parallel_members_share_one_snapshot() {
        let (runner, completion) = runner(
            ScriptedCompletion::new().delay("a", Duration::from_millis(5)),
            RuntimeConfig::default(),
        );
        let group = ParallelGroup::new(
            "g",
            vec![persona("a", "A"), persona("b", "B")],
        )
        .unwrap();
        let mut state = SharedState::seeded([(key("seed"), "x")]);

        runner
            .run(&group.into(), &mut state, "", &RunContext::detached())
            .await
            .unwrap();

        for request in completion.requests() {
            let seen: Vec<&str> = request.state.keys().map(|k| k.as_str()).collect();
            assert_eq!(seen, vec!["seed"]);
        }
    }

    #[tokio::test]
    async fn test_fail_fast_propagates_and_writes_nothing() {
        let (runner, _) = runner(
            ScriptedCompletion::new()
                .fail("c", "quota exceeded")
                .delay("a", Duration::from_millis(200)),
            RuntimeConfig::default(),
        );
        let mut state = SharedState::new();

        let error = runner
            .run(&five_persona_group().into(), &mut state, "", &RunContext::detached())
            .await
            .unwrap_err();

        match error {
            StageError::GroupFailed { group, member, .. } => {
                assert_eq!(group, "panel");
                assert_eq!(member, "c");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_reports_partial_results() {
        let (runner, _) = runner(
            ScriptedCompletion::new().fail("b", "overloaded").fail("d", "overloaded"),
            RuntimeConfig::default().with_failure_policy(FailurePolicy::BestEffort),
        );
        let mut state = SharedState::new();
        let ctx = RunContext::detached();

        let outcome = runner
            .run(&five_persona_group().into(), &mut state, "", &ctx)
            .await
            .unwrap();

        let report = &outcome.groups[0];
        assert_eq!(report.completed, vec!["a", "c", "e"]);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.member.as_str()).collect();
        assert_eq!(failed, vec!["b", "d"]);
        assert_eq!(state.len(), 3);
        assert!(!state.contains("b_output"));
        let member_failed = ctx
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, RunEvent::MemberFailed { .. }))
            .count();
        assert_eq!(member_failed, 2);
    }

    #[tokio::test]
    async fn test_best_effort_all_failed() {
        let (runner, _) = runner(
            ScriptedCompletion::new().fail("a", "x").fail("b", "y"),
            RuntimeConfig::default().with_failure_policy(FailurePolicy::BestEffort),
        );
        let group = ParallelGroup::new("g", vec![persona("a", ""), persona("b", "")]).unwrap();

        let error = runner
            .run(&group.into(), &mut SharedState::new(), "", &RunContext::detached())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            StageError::AllMembersFailed { ref failures, .. } if failures.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_concurrency_limit_of_one_still_completes() {
        let (runner, completion) = runner(
            ScriptedCompletion::new(),
            RuntimeConfig::default().with_max_concurrency(1),
        );
        let mut state = SharedState::new();

        runner
            .run(&five_persona_group().into(), &mut state, "", &RunContext::detached())
            .await
            .unwrap();

        assert_eq!(completion.requests().len(), 5);
        assert_eq!(state.len(), 5);
    }

    // ==================== Cancellation ====================

    #[tokio::test]
    async fn test_cancellation_aborts_group_in_place() {
        let (runner, _) = runner(
            ScriptedCompletion::new()
                .delay("a", Duration::from_secs(30))
                .delay("b", Duration::from_secs(30)),
            RuntimeConfig::default(),
        );
        let group = ParallelGroup::new("g", vec![persona("a", ""), persona("b", "")]).unwrap();
        let pipeline = SequentialPipeline::new(
            "p",
            vec![persona("head", "").into(), group.into()],
        )
        .unwrap();
        let ctx = RunContext::detached();
        let token = ctx.cancel_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
        let mut state = SharedState::new();

        let error = runner
            .run(&pipeline.into(), &mut state, "", &ctx)
            .await
            .unwrap_err();

        assert!(error.is_cancelled());
        assert!(state.contains("head_output"));
        assert!(!state.contains("a_output"));
    }

    #[tokio::test]
    async fn test_stage_events_in_order() {
        let (runner, _) = runner(ScriptedCompletion::new(), RuntimeConfig::default());
        let ctx = RunContext::detached();

        runner
            .run(
                &persona("solo", "").into(),
                &mut SharedState::new(),
                "",
                &ctx,
            )
            .await
            .unwrap();

        let types: Vec<&str> = ctx.drain_events().iter().map(RunEvent::event_type).collect();
        assert_eq!(types, vec!["stage_started", "agent_response", "state_delta"]);
    }
}
