//! Tool handler port
//!
//! Dispatches tool calls requested by a persona. Handlers never fail: a
//! failing tool answers with a `{"status": "error", ...}` payload so the
//! model can explain the failure.

use async_trait::async_trait;
use think_tank_domain::{ToolCall, ToolDefinition, ToolResponse};

#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Tools this handler can dispatch
    fn definitions(&self) -> Vec<ToolDefinition>;

    async fn call(&self, call: &ToolCall) -> ToolResponse;
}
