//! Application layer for think-tank
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::RuntimeConfig;
pub use ports::{
    artifact_store::{ArtifactStore, ArtifactStoreError},
    clarification::{CannedAnswers, ClarificationError, ClarificationResponder, SkipClarification},
    completion::{Completion, CompletionError, CompletionRequest, CompletionService, Turn},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    document_renderer::{DocumentRenderer, RenderError, ReportDocument},
    progress::{NoProgress, ProgressNotifier},
    session_store::{SessionStore, SessionStoreError, SessionSummary},
    tool_handler::ToolHandler,
};
pub use use_cases::invoke_persona::PersonaInvoker;
pub use use_cases::publish_artifact::{ArtifactPublisher, PublishError, PublisherTools};
pub use use_cases::run_agent::{AgentRunner, RunAgentError, RunAgentInput, RunAgentOutput};
pub use use_cases::run_context::RunContext;
pub use use_cases::run_stage::{StageError, StageRunner};
pub use use_cases::run_think_tank::{
    CoordinatorError, PendingClarification, ThinkTankCoordinator, ThinkTankInput, ThinkTankReport,
};
