//! Agent catalog
//!
//! Builds the static agent trees shipped with the application:
//! - [`think_tank::ThinkTank`] - clarification, persona group and synthesizer
//! - [`email_writer`] - structured email generation
//! - [`content_publisher`] - markdown to PDF publishing through tools

pub mod content_publisher;
pub mod email_writer;
pub mod personas;
pub mod think_tank;

use crate::core::error::CompositionError;
use crate::core::model::Model;
use crate::persona::descriptor::PersonaDescriptor;
use personas::ThinkTankPersona;
use std::collections::BTreeMap;
use think_tank::ThinkTank;

/// Factory for the agent trees, carrying per-agent model overrides
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    model_overrides: BTreeMap<String, Model>,
}

impl AgentCatalog {
    pub fn new(model_overrides: BTreeMap<String, Model>) -> Self {
        Self { model_overrides }
    }

    pub fn with_override(mut self, agent: impl Into<String>, model: Model) -> Self {
        self.model_overrides.insert(agent.into(), model);
        self
    }

    pub fn think_tank(&self, roster: &[ThinkTankPersona]) -> Result<ThinkTank, CompositionError> {
        ThinkTank::build(self, roster)
    }

    pub fn email_writer(&self) -> Result<PersonaDescriptor, CompositionError> {
        email_writer::build(self)
    }

    pub fn content_publisher(&self) -> Result<PersonaDescriptor, CompositionError> {
        content_publisher::build(self)
    }

    fn apply_model(&self, persona: PersonaDescriptor) -> PersonaDescriptor {
        match self.model_overrides.get(persona.name()) {
            Some(model) => persona.with_model(model.clone()),
            None => persona,
        }
    }
}
