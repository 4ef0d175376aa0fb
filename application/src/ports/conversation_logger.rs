//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording run events
//! (stage starts, persona responses, state writes, tool calls, final
//! responses) to a structured transcript.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the run transcript
//! in a machine-readable format (JSONL).

use chrono::{DateTime, Utc};
use serde_json::Value;
use think_tank_domain::RunEvent;

/// A structured transcript event.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "stage_started", "tool_call").
    pub event_type: &'static str,
    pub timestamp: DateTime<Utc>,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    /// Create a new event stamped with the current UTC time.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

impl From<&RunEvent> for ConversationEvent {
    fn from(event: &RunEvent) -> Self {
        let mut payload = serde_json::to_value(event).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut payload {
            map.remove("type");
        }
        ConversationEvent::new(event.event_type(), payload)
    }
}

/// Port for logging transcript events.
///
/// `log` is synchronous and infallible so logging never disrupts a run;
/// implementations swallow their own write failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
