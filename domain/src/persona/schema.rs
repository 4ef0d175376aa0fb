//! Structured output schemas.
//!
//! A persona that declares an [`OutputSchema`] must answer with a JSON
//! object carrying exactly the declared fields. [`OutputSchema::coerce`]
//! turns the raw completion text into that object or fails with a
//! [`SchemaError`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a completion could not be coerced to a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Completion is not valid JSON: {0}")]
    NotJson(String),

    #[error("Completion is JSON but not an object")]
    NotAnObject,

    #[error("Missing field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' should be of type {expected}")]
    WrongType { field: String, expected: FieldKind },
}

/// JSON type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub description: String,
    pub kind: FieldKind,
}

impl SchemaField {
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: FieldKind::String,
        }
    }
}

/// Declared shape of a structured persona output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Coerce a raw completion into an object with exactly the declared fields.
    ///
    /// Surrounding markdown code fences are stripped first. Undeclared
    /// fields are dropped; missing or mistyped declared fields are errors.
    pub fn coerce(&self, raw: &str) -> Result<Value, SchemaError> {
        let body = strip_code_fence(raw);
        let parsed: Value =
            serde_json::from_str(body).map_err(|e| SchemaError::NotJson(e.to_string()))?;
        let Value::Object(mut object) = parsed else {
            return Err(SchemaError::NotAnObject);
        };

        let mut coerced = Map::new();
        for field in &self.fields {
            let value = object
                .remove(&field.name)
                .ok_or_else(|| SchemaError::MissingField(field.name.clone()))?;
            if !field.kind.matches(&value) {
                return Err(SchemaError::WrongType {
                    field: field.name.clone(),
                    expected: field.kind,
                });
            }
            coerced.insert(field.name.clone(), value);
        }
        Ok(Value::Object(coerced))
    }
}

/// Strip a surrounding ```` ```json ... ``` ```` fence if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
