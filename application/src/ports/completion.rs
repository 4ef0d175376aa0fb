//! Completion Service port
//!
//! Defines the interface to the hosted model that turns an instruction,
//! a conversation and optional schema/tool declarations into a completion.

use async_trait::async_trait;
use think_tank_domain::{Model, OutputSchema, SharedState, ToolCall, ToolDefinition, ToolResponse};
use thiserror::Error;

/// Errors that can occur while asking the completion service
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One turn of the conversation sent to the model
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Text from the user
    User(String),
    /// Text previously produced by the model
    Model(String),
    /// Tool calls previously requested by the model
    ToolCalls(Vec<ToolCall>),
    /// Results of those tool calls
    ToolResults(Vec<ToolResponse>),
}

/// Everything the model needs for one completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Name of the persona asking, for logs and routing
    pub agent: String,
    pub model: Model,
    /// Instruction with state placeholders already substituted
    pub instruction: String,
    /// Snapshot of Shared State the instruction was rendered from
    pub state: SharedState,
    pub turns: Vec<Turn>,
    pub output_schema: Option<OutputSchema>,
    pub tools: Vec<ToolDefinition>,
}

/// What the model answered
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Final text (JSON text when a schema was requested)
    Text(String),
    /// The model wants these tools called before it answers
    ToolCalls(Vec<ToolCall>),
}

/// Port to the completion service.
///
/// Implementations (adapters) live in the infrastructure layer. The port
/// performs no retries; a failure propagates to the invoking stage.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}
