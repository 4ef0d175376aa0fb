//! Orchestration domain
//!
//! The composition tree and what running it produces:
//! - [`stage::Stage`] - persona, parallel group or sequential pipeline
//! - [`policy::FailurePolicy`] - how a group reacts to a failing member
//! - [`value_objects`] - invocation results, group reports
//! - [`clarification`] - question parsing and the refined request

pub mod clarification;
pub mod policy;
pub mod stage;
pub mod value_objects;
