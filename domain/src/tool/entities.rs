//! Tool entities: declarations offered to the model and the calls it makes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A single parameter in a tool declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// JSON schema type (`string`, `number`, `boolean`, ...)
    #[serde(rename = "type")]
    pub param_type: String,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Declaration of a callable tool (function) exposed to a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// JSON schema object describing the parameters
    pub fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.param_type, "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<&str, String> {
        self.get_str(key)
            .ok_or_else(|| format!("Missing required string argument '{}'", key))
    }
}

/// The payload returned to the model for one [`ToolCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub name: String,
    pub payload: Value,
}

impl ToolResponse {
    pub fn new(call: &ToolCall, payload: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            payload,
        }
    }

    /// Whether the payload reports `"status": "error"`
    pub fn is_error(&self) -> bool {
        self.payload.get("status").and_then(Value::as_str) == Some("error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_schema_lists_required() {
        let definition = ToolDefinition::new("markdown_to_pdf", "Convert markdown")
            .with_parameter(ToolParameter::new("markdown_text", "Markdown input", true))
            .with_parameter(ToolParameter::new("filename", "Artifact name", false));
        let schema = definition.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["markdown_text"]["type"], "string");
        assert_eq!(schema["required"], json!(["markdown_text"]));
    }

    #[test]
    fn test_tool_call_arguments() {
        let call = ToolCall::new("publish_pdf").with_arg("pdf_artifact_name", "user:report.pdf");
        assert_eq!(call.get_str("pdf_artifact_name"), Some("user:report.pdf"));
        assert!(call.require_str("filename").is_err());
    }

    #[test]
    fn test_tool_response_error_detection() {
        let call = ToolCall::new("publish_pdf");
        let ok = ToolResponse::new(&call, json!({"status": "success"}));
        let failed = ToolResponse::new(&call, json!({"status": "error", "message": "x"}));
        assert!(!ok.is_error());
        assert!(failed.is_error());
    }
}
