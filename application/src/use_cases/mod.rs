//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod invoke_persona;
pub mod publish_artifact;
pub mod run_agent;
pub mod run_context;
pub mod run_stage;
pub mod run_think_tank;
