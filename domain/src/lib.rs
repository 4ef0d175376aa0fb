//! Domain layer for think-tank
//!
//! This crate contains the agent composition model, Shared State, and the
//! static agent catalog. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Stages
//!
//! An agent tree is built from three stage kinds:
//!
//! - **Persona Unit**: one instruction, one completion, one output key
//! - **Parallel Group**: personas fanned out over one state snapshot
//! - **Sequential Pipeline**: stages run in order, each seeing prior writes
//!
//! ## Shared State
//!
//! Instructions reference state with `{key}` placeholders. Bindings are
//! checked when a tree is built ([`Stage::validate`]), not when it runs.

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod core;
pub mod orchestration;
pub mod persona;
pub mod prompt;
pub mod session;
pub mod state;
pub mod tool;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactRef};
pub use catalog::{
    AgentCatalog,
    content_publisher::{MARKDOWN_TO_PDF, PUBLISH_PDF},
    email_writer::EmailContent,
    personas::ThinkTankPersona,
    think_tank::ThinkTank,
};
pub use config::OutputFormat;
pub use core::{error::CompositionError, model::Model};
pub use orchestration::{
    clarification::{ClarificationExchange, compose_refined_request, pair_answers, parse_questions},
    policy::FailurePolicy,
    stage::{ParallelGroup, SequentialPipeline, Stage, StageKind},
    value_objects::{GroupReport, InvocationResult, MemberFailure, StageOutcome, StageOutput},
};
pub use persona::{
    descriptor::PersonaDescriptor,
    schema::{FieldKind, OutputSchema, SchemaError, SchemaField},
};
pub use prompt::{ThinkTankPrompt, UtilityPrompt};
pub use session::{
    entities::{Session, SessionKey},
    events::RunEvent,
};
pub use state::{
    key::StateKey,
    keys,
    shared_state::SharedState,
    template::{InstructionTemplate, Placeholder, RenderedInstruction},
};
pub use tool::entities::{ToolCall, ToolDefinition, ToolParameter, ToolResponse};
