//! Wire types for the Gemini `generateContent` REST API.
//!
//! # Protocol Overview
//!
//! - **Request**: system instruction, `contents` (alternating `user` / `model`
//!   turns), optional `tools` with function declarations and optional
//!   `generationConfig` requesting JSON output with a response schema
//! - **Response**: `candidates[0].content.parts`, each either `text` or a
//!   `functionCall`; a blocked prompt carries `promptFeedback.blockReason`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use think_tank_application::ports::completion::{
    Completion, CompletionError, CompletionRequest, Turn,
};
use think_tank_domain::{OutputSchema, ToolCall, ToolDefinition, ToolResponse};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        ..Default::default()
    }
}

fn content(role: &str, parts: Vec<Part>) -> Content {
    Content {
        role: Some(role.to_string()),
        parts,
    }
}

fn turn_to_content(turn: &Turn) -> Content {
    match turn {
        Turn::User(text) => content("user", vec![text_part(text)]),
        Turn::Model(text) => content("model", vec![text_part(text)]),
        Turn::ToolCalls(calls) => content(
            "model",
            calls
                .iter()
                .map(|call| Part {
                    function_call: Some(FunctionCall {
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                    }),
                    ..Default::default()
                })
                .collect(),
        ),
        Turn::ToolResults(responses) => content(
            "user",
            responses.iter().map(response_part).collect(),
        ),
    }
}

fn response_part(response: &ToolResponse) -> Part {
    // functionResponse.response must be an object
    let payload = match &response.payload {
        Value::Object(_) => response.payload.clone(),
        other => json!({ "result": other }),
    };
    Part {
        function_response: Some(FunctionResponse {
            name: response.name.clone(),
            response: payload,
        }),
        ..Default::default()
    }
}

fn declaration(tool: &ToolDefinition) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: tool.parameters_schema(),
    }
}

/// Gemini response schema (OpenAPI subset, upper-case type names)
pub fn response_schema(schema: &OutputSchema) -> Value {
    let properties: Map<String, Value> = schema
        .fields
        .iter()
        .map(|field| {
            (
                field.name.clone(),
                json!({
                    "type": field.kind.as_str().to_uppercase(),
                    "description": field.description,
                }),
            )
        })
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": schema.field_names().collect::<Vec<_>>(),
    })
}

impl GenerateContentRequest {
    pub fn from_request(request: &CompletionRequest) -> Self {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![Tool {
                function_declarations: request.tools.iter().map(declaration).collect(),
            }]
        };
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![text_part(&request.instruction)],
            },
            contents: request.turns.iter().map(turn_to_content).collect(),
            tools,
            generation_config: request.output_schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(schema),
            }),
        }
    }
}

impl GenerateContentResponse {
    /// Interpret the first candidate as a completion
    pub fn into_completion(self) -> Result<Completion, CompletionError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CompletionError::Blocked(reason));
        }
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("no candidates".to_string()))?;
        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(CompletionError::Blocked("SAFETY".to_string()));
        }

        let calls: Vec<ToolCall> = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.function_call.as_ref())
            .map(|call| ToolCall {
                id: None,
                name: call.name.clone(),
                arguments: call.args.clone(),
            })
            .collect();
        if !calls.is_empty() {
            return Ok(Completion::ToolCalls(calls));
        }

        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Ok(Completion::Text(text))
    }
}
