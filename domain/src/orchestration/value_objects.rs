//! Orchestration value objects - immutable results of running stages.
//!
//! - [`InvocationResult`] - what one Persona Unit produced
//! - [`StageOutput`] - a result tagged with its author
//! - [`MemberFailure`] - a parallel member that failed under best-effort
//! - [`GroupReport`] - per-group summary of completed and failed members
//! - [`StageOutcome`] - what a whole stage (tree) run produced

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one Persona Unit invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InvocationResult {
    /// Free-form completion text
    Text(String),
    /// Object coerced to the persona's output schema
    Structured(Value),
}

impl InvocationResult {
    /// Value written to Shared State under the output key
    pub fn to_state_value(&self) -> Value {
        match self {
            InvocationResult::Text(text) => Value::String(text.clone()),
            InvocationResult::Structured(value) => value.clone(),
        }
    }

    /// Human-readable rendering (structured results are pretty JSON)
    pub fn as_text(&self) -> String {
        match self {
            InvocationResult::Text(text) => text.clone(),
            InvocationResult::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            InvocationResult::Structured(value) => Some(value),
            InvocationResult::Text(_) => None,
        }
    }
}

/// A result together with the persona that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub author: String,
    pub result: InvocationResult,
}

impl StageOutput {
    pub fn new(author: impl Into<String>, result: InvocationResult) -> Self {
        Self {
            author: author.into(),
            result,
        }
    }
}

/// A parallel member that failed while its siblings were allowed to finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFailure {
    pub member: String,
    pub error: String,
}

/// Summary of one parallel group run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupReport {
    pub group: String,
    /// Members that completed, in declaration order
    pub completed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<MemberFailure>,
}

impl GroupReport {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            ..Default::default()
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// What running a stage tree produced
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Last result produced by a persona in the tree, if any
    pub output: Option<StageOutput>,
    /// One report per parallel group that ran
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupReport>,
}

impl StageOutcome {
    pub fn from_output(output: StageOutput) -> Self {
        Self {
            output: Some(output),
            groups: Vec::new(),
        }
    }

    pub fn from_group(report: GroupReport) -> Self {
        Self {
            output: None,
            groups: vec![report],
        }
    }

    /// Fold a later stage's outcome into this one.
    ///
    /// The later output wins when present; group reports accumulate.
    pub fn merge(&mut self, later: StageOutcome) {
        if later.output.is_some() {
            self.output = later.output;
        }
        self.groups.extend(later.groups);
    }

    /// All member failures across every group
    pub fn failures(&self) -> impl Iterator<Item = &MemberFailure> {
        self.groups.iter().flat_map(|g| g.failures.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_result_state_value() {
        let result = InvocationResult::Text("hello".to_string());
        assert_eq!(result.to_state_value(), json!("hello"));
        assert_eq!(result.as_text(), "hello");
        assert!(result.as_structured().is_none());
    }

    #[test]
    fn test_structured_result_state_value() {
        let result = InvocationResult::Structured(json!({"subject": "Hi"}));
        assert_eq!(result.to_state_value(), json!({"subject": "Hi"}));
        assert!(result.as_text().contains("\"subject\""));
    }

    #[test]
    fn test_outcome_merge_keeps_last_output_and_all_groups() {
        let mut outcome = StageOutcome::from_group(GroupReport::new("think_tank"));
        outcome.merge(StageOutcome::from_output(StageOutput::new(
            "synthesizer",
            InvocationResult::Text("plan".to_string()),
        )));
        outcome.merge(StageOutcome::default());
        assert_eq!(outcome.output.as_ref().unwrap().author, "synthesizer");
        assert_eq!(outcome.groups.len(), 1);
    }

    #[test]
    fn test_failures_flatten_groups() {
        let mut report = GroupReport::new("g");
        report.failures.push(MemberFailure {
            member: "a".to_string(),
            error: "boom".to_string(),
        });
        assert!(report.is_partial());
        let outcome = StageOutcome::from_group(report);
        assert_eq!(outcome.failures().count(), 1);
    }
}
