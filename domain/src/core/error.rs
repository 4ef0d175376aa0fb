//! Domain error types

use thiserror::Error;

/// Errors raised while building or validating an agent tree.
///
/// These are construction-time failures: a tree that passes
/// [`Stage::validate`](crate::orchestration::stage::Stage::validate) never
/// produces them at run time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Invalid state key: '{0}'")]
    InvalidStateKey(String),

    #[error("Agent name cannot be empty")]
    EmptyName,

    #[error("Stage '{stage}' references state key '{key}' that no earlier stage or seed provides")]
    UnknownPlaceholder { stage: String, key: String },

    #[error("Output key '{key}' of stage '{stage}' is already written by another stage or the seed state")]
    DuplicateOutputKey { stage: String, key: String },

    #[error("Parallel member '{stage}' has no output key; its result would be lost")]
    MissingOutputKey { stage: String },

    #[error("Parallel group '{0}' has no members")]
    EmptyGroup(String),

    #[error("Sequential pipeline '{0}' has no stages")]
    EmptyPipeline(String),

    #[error("Unknown persona: '{0}'")]
    UnknownPersona(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_placeholder_display_names_stage_and_key() {
        let error = CompositionError::UnknownPlaceholder {
            stage: "synthesizer".to_string(),
            key: "mckinsey_output".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("synthesizer"));
        assert!(message.contains("mckinsey_output"));
    }

    #[test]
    fn test_empty_group_display() {
        let error = CompositionError::EmptyGroup("think_tank".to_string());
        assert_eq!(error.to_string(), "Parallel group 'think_tank' has no members");
    }
}
