//! Runtime configuration - passed down the agent tree at construction.
//!
//! [`RuntimeConfig`] replaces ambient environment lookups in the leaves:
//! the model default, the group failure policy and the loop limits are
//! decided once by the caller and handed to the use cases.

use serde::{Deserialize, Serialize};
use think_tank_domain::{FailurePolicy, Model};

/// Execution settings shared by every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Model used by personas without an override.
    pub default_model: Model,
    /// How parallel groups react to a failing member.
    pub failure_policy: FailurePolicy,
    /// Upper bound on concurrently running members of one group.
    pub max_concurrency: usize,
    /// Maximum tool-call rounds in a single persona invocation.
    pub max_tool_rounds: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_model: Model::default(),
            failure_policy: FailurePolicy::default(),
            max_concurrency: 8,
            max_tool_rounds: 8,
        }
    }
}

impl RuntimeConfig {
    // ==================== Builder Methods ====================

    pub fn with_default_model(mut self, model: Model) -> Self {
        self.default_model = model;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.default_model, Model::Gemini20Flash);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.max_tool_rounds, 8);
    }

    #[test]
    fn test_builder() {
        let config = RuntimeConfig::default()
            .with_failure_policy(FailurePolicy::BestEffort)
            .with_max_concurrency(2);
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.max_concurrency, 2);
    }
}
