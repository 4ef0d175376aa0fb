//! Invoke Persona use case
//!
//! Renders one persona's instruction against Shared State, asks the
//! completion service (running the tool loop when the persona has tools),
//! coerces structured output, and writes the result under the output key.

use super::run_context::RunContext;
use super::run_stage::StageError;
use crate::config::RuntimeConfig;
use crate::ports::completion::{Completion, CompletionRequest, CompletionService, Turn};
use crate::ports::tool_handler::ToolHandler;
use serde_json::json;
use std::sync::Arc;
use think_tank_domain::{
    InvocationResult, PersonaDescriptor, RunEvent, SharedState, ToolCall, ToolResponse,
};
use tracing::{debug, info, warn};

/// Runs single persona invocations.
///
/// Cloning shares the completion service and tool handler, so a clone can
/// be moved into each parallel member task.
pub struct PersonaInvoker<C: CompletionService + 'static> {
    completion: Arc<C>,
    tools: Option<Arc<dyn ToolHandler>>,
    config: RuntimeConfig,
}

impl<C: CompletionService + 'static> Clone for PersonaInvoker<C> {
    fn clone(&self) -> Self {
        Self {
            completion: Arc::clone(&self.completion),
            tools: self.tools.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: CompletionService + 'static> PersonaInvoker<C> {
    pub fn new(completion: Arc<C>, config: RuntimeConfig) -> Self {
        Self {
            completion,
            tools: None,
            config,
        }
    }

    /// Dispatch tool calls of personas that declare tools through `tools`
    pub fn with_tools(mut self, tools: Arc<dyn ToolHandler>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Invoke `persona` and write its result to `state` under its output key.
    ///
    /// Without an output key the result is only returned.
    pub async fn invoke(
        &self,
        persona: &PersonaDescriptor,
        state: &mut SharedState,
        user_input: &str,
        ctx: &RunContext,
    ) -> Result<InvocationResult, StageError> {
        let result = self.produce(persona, state, user_input, ctx).await?;
        write_output(persona, &result, state, ctx);
        Ok(result)
    }

    /// Invoke `persona` against a read-only state, without writing anything.
    pub async fn produce(
        &self,
        persona: &PersonaDescriptor,
        state: &SharedState,
        user_input: &str,
        ctx: &RunContext,
    ) -> Result<InvocationResult, StageError> {
        let rendered = persona.instruction().render(state);
        if !rendered.unresolved.is_empty() {
            let keys: Vec<&str> = rendered.unresolved.iter().map(|k| k.as_str()).collect();
            warn!(
                "Persona {} references missing state keys {:?}; passing placeholders through",
                persona.name(),
                keys
            );
        }
        debug!(
            "Persona {} instruction rendered ({} chars)",
            persona.name(),
            rendered.text.len()
        );

        if !persona.tools().is_empty() && !self.handles_tools_of(persona) {
            return Err(StageError::ToolsUnavailable {
                persona: persona.name().to_string(),
            });
        }

        let model = persona
            .model()
            .cloned()
            .unwrap_or_else(|| self.config.default_model.clone());
        let mut request = CompletionRequest {
            agent: persona.name().to_string(),
            model,
            instruction: rendered.text,
            state: state.clone(),
            turns: vec![Turn::User(user_input.to_string())],
            output_schema: persona.output_schema().cloned(),
            tools: persona.tools().to_vec(),
        };

        let mut rounds = 0;
        let text = loop {
            let result = tokio::select! {
                biased;
                _ = ctx.cancel_token().cancelled() => return Err(StageError::Cancelled),
                result = self.completion.complete(&request) => result,
            };
            let completion = result.map_err(|source| StageError::Completion {
                persona: persona.name().to_string(),
                source,
            })?;

            match completion {
                Completion::Text(text) => break text,
                Completion::ToolCalls(calls) => {
                    rounds += 1;
                    if rounds > self.config.max_tool_rounds {
                        return Err(StageError::ToolLoopExceeded {
                            persona: persona.name().to_string(),
                            limit: self.config.max_tool_rounds,
                        });
                    }
                    let responses = self.dispatch_tools(persona, &calls, ctx).await;
                    request.turns.push(Turn::ToolCalls(calls));
                    request.turns.push(Turn::ToolResults(responses));
                }
            }
        };

        let result = match persona.output_schema() {
            Some(schema) => {
                let value =
                    schema
                        .coerce(&text)
                        .map_err(|source| StageError::SchemaViolation {
                            persona: persona.name().to_string(),
                            schema: schema.name.clone(),
                            source,
                        })?;
                InvocationResult::Structured(value)
            }
            None => InvocationResult::Text(text),
        };

        info!("Persona {} responded", persona.name());
        ctx.emit(RunEvent::AgentResponse {
            author: persona.name().to_string(),
            content: result.as_text(),
        });
        Ok(result)
    }

    /// Whether the tool handler can dispatch every tool `persona` declares
    fn handles_tools_of(&self, persona: &PersonaDescriptor) -> bool {
        let Some(handler) = &self.tools else {
            return false;
        };
        let available = handler.definitions();
        persona
            .tools()
            .iter()
            .all(|tool| available.iter().any(|d| d.name == tool.name))
    }

    async fn dispatch_tools(
        &self,
        persona: &PersonaDescriptor,
        calls: &[ToolCall],
        ctx: &RunContext,
    ) -> Vec<ToolResponse> {
        let mut responses = Vec::with_capacity(calls.len());
        for call in calls {
            ctx.emit(RunEvent::ToolCall {
                author: persona.name().to_string(),
                tool: call.name.clone(),
                arguments: serde_json::Value::Object(call.arguments.clone()),
            });

            let declared = persona.tools().iter().any(|t| t.name == call.name);
            let response = match &self.tools {
                Some(handler) if declared => handler.call(call).await,
                _ => {
                    warn!(
                        "Persona {} called undeclared tool {}",
                        persona.name(),
                        call.name
                    );
                    ToolResponse::new(
                        call,
                        json!({
                            "status": "error",
                            "message": format!("Unknown tool '{}'", call.name),
                        }),
                    )
                }
            };
            debug!(
                "Tool {} answered (error: {})",
                call.name,
                response.is_error()
            );

            ctx.emit(RunEvent::ToolResult {
                author: persona.name().to_string(),
                tool: call.name.clone(),
                payload: response.payload.clone(),
            });
            responses.push(response);
        }
        responses
    }
}

/// Write `result` under the persona's output key, if it has one.
pub(crate) fn write_output(
    persona: &PersonaDescriptor,
    result: &InvocationResult,
    state: &mut SharedState,
    ctx: &RunContext,
) {
    let Some(key) = persona.output_key() else {
        return;
    };
    if state.insert(key.clone(), result.to_state_value()).is_some() {
        debug!("State key {} overwritten by {}", key, persona.name());
    } else {
        debug!("State key {} written by {}", key, persona.name());
    }
    ctx.emit(RunEvent::StateDelta {
        author: persona.name().to_string(),
        key: key.to_string(),
    });
}
