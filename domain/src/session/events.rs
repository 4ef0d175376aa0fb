//! Events recorded while an agent tree runs.
//!
//! Runners stream these to the caller and append them to the session.
//! The last event of a successful run is always a
//! [`RunEvent::FinalResponse`].

use crate::orchestration::stage::StageKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// The message submitted by the user
    UserMessage { content: String },
    /// A stage is about to run
    StageStarted { stage: String, kind: StageKind },
    /// A persona produced its result
    AgentResponse { author: String, content: String },
    /// A persona wrote its output key
    StateDelta { author: String, key: String },
    /// A persona asked for a tool
    ToolCall {
        author: String,
        tool: String,
        arguments: Value,
    },
    /// The tool answered
    ToolResult {
        author: String,
        tool: String,
        payload: Value,
    },
    /// The coordinator suspended to ask the user
    ClarificationRequested { questions: Vec<String> },
    /// A parallel member failed and its siblings were allowed to finish
    MemberFailed { member: String, error: String },
    /// The externally visible result of the run
    FinalResponse { author: String, content: String },
}

impl RunEvent {
    pub fn user_message(content: impl Into<String>) -> Self {
        RunEvent::UserMessage {
            content: content.into(),
        }
    }

    pub fn final_response(author: impl Into<String>, content: impl Into<String>) -> Self {
        RunEvent::FinalResponse {
            author: author.into(),
            content: content.into(),
        }
    }

    pub fn is_final_response(&self) -> bool {
        matches!(self, RunEvent::FinalResponse { .. })
    }

    /// Event name as used in transcripts
    pub fn event_type(&self) -> &'static str {
        match self {
            RunEvent::UserMessage { .. } => "user_message",
            RunEvent::StageStarted { .. } => "stage_started",
            RunEvent::AgentResponse { .. } => "agent_response",
            RunEvent::StateDelta { .. } => "state_delta",
            RunEvent::ToolCall { .. } => "tool_call",
            RunEvent::ToolResult { .. } => "tool_result",
            RunEvent::ClarificationRequested { .. } => "clarification_requested",
            RunEvent::MemberFailed { .. } => "member_failed",
            RunEvent::FinalResponse { .. } => "final_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_final_response_is_final() {
        assert!(RunEvent::final_response("synthesizer", "done").is_final_response());
        assert!(!RunEvent::user_message("hi").is_final_response());
    }

    #[test]
    fn test_serialized_type_matches_event_type() {
        let events = vec![
            RunEvent::user_message("hi"),
            RunEvent::StageStarted {
                stage: "think_tank".to_string(),
                kind: StageKind::Parallel,
            },
            RunEvent::ClarificationRequested {
                questions: vec!["Why?".to_string()],
            },
            RunEvent::final_response("a", "b"),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.event_type());
        }
    }
}
