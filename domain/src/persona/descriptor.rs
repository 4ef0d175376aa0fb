//! Persona Unit descriptor

use super::schema::OutputSchema;
use crate::core::error::CompositionError;
use crate::core::model::Model;
use crate::state::key::StateKey;
use crate::state::template::InstructionTemplate;
use crate::tool::entities::ToolDefinition;
use serde::{Deserialize, Serialize};

/// Immutable description of one role-scoped worker.
///
/// Built once at startup from static configuration and shared by every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    name: String,
    description: String,
    instruction: InstructionTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_key: Option<StateKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_schema: Option<OutputSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<Model>,
}

impl PersonaDescriptor {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<InstructionTemplate>,
    ) -> Result<Self, CompositionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CompositionError::EmptyName);
        }
        Ok(Self {
            name,
            description: String::new(),
            instruction: instruction.into(),
            output_key: None,
            output_schema: None,
            tools: Vec::new(),
            model: None,
        })
    }

    // ==================== Builder Methods ====================

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_string();
        self
    }

    pub fn with_output_key(mut self, key: StateKey) -> Self {
        self.output_key = Some(key);
        self
    }

    pub fn with_output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    // ==================== Accessors ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instruction(&self) -> &InstructionTemplate {
        &self.instruction
    }

    pub fn output_key(&self) -> Option<&StateKey> {
        self.output_key.as_ref()
    }

    pub fn output_schema(&self) -> Option<&OutputSchema> {
        self.output_schema.as_ref()
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Model override; `None` means the runtime default.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_rejected() {
        assert_eq!(
            PersonaDescriptor::new("  ", "Do things").unwrap_err(),
            CompositionError::EmptyName
        );
    }

    #[test]
    fn test_builder_sets_fields() {
        let persona = PersonaDescriptor::new("mckinsey", "ROLE: Strategy Partner")
            .unwrap()
            .with_description("\nStrategy consultant\n")
            .with_output_key(StateKey::new("mckinsey_output").unwrap())
            .with_model(Model::Gemini25Pro);
        assert_eq!(persona.name(), "mckinsey");
        assert_eq!(persona.description(), "Strategy consultant");
        assert_eq!(persona.output_key().unwrap().as_str(), "mckinsey_output");
        assert_eq!(persona.model(), Some(&Model::Gemini25Pro));
        assert!(persona.output_schema().is_none());
        assert!(persona.tools().is_empty());
    }

    #[test]
    fn test_empty_instruction_is_allowed() {
        let persona = PersonaDescriptor::new("blank", "").unwrap();
        assert!(persona.instruction().is_empty());
    }
}
