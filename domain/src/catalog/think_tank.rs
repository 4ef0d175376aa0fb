//! The think tank agent tree: clarification, persona group, synthesizer.

use super::AgentCatalog;
use super::personas::ThinkTankPersona;
use crate::core::error::CompositionError;
use crate::orchestration::stage::{ParallelGroup, SequentialPipeline, Stage};
use crate::persona::descriptor::PersonaDescriptor;
use crate::prompt::ThinkTankPrompt;
use crate::state::key::StateKey;
use crate::state::keys;
use std::collections::BTreeSet;

pub const CLARIFICATION_AGENT: &str = "clarification";
pub const THINK_TANK_GROUP: &str = "think_tank";
pub const SYNTHESIZER_AGENT: &str = "synthesizer";
pub const FACILITATOR_PIPELINE: &str = "facilitator";

/// The agents the Root Coordinator drives
#[derive(Debug, Clone, PartialEq)]
pub struct ThinkTank {
    /// Runs before the human-in-the-loop suspension
    pub clarification: PersonaDescriptor,
    /// Parallel persona group followed by the synthesizer
    pub facilitator: Stage,
    pub roster: Vec<ThinkTankPersona>,
}

impl ThinkTank {
    pub(super) fn build(
        catalog: &AgentCatalog,
        roster: &[ThinkTankPersona],
    ) -> Result<Self, CompositionError> {
        let clarification = catalog.apply_model(
            PersonaDescriptor::new(CLARIFICATION_AGENT, ThinkTankPrompt::clarification())?
                .with_description(
                    "Reviews the user's request and asks 4-5 focused questions that fill the information gaps the personas need.",
                )
                .with_output_key(StateKey::new(keys::CLARIFICATION_OUTPUT)?),
        );

        let members = roster
            .iter()
            .map(|persona| -> Result<PersonaDescriptor, CompositionError> {
                Ok(catalog.apply_model(
                    PersonaDescriptor::new(persona.id(), persona.instruction())?
                        .with_description(persona.description())
                        .with_output_key(StateKey::new(persona.output_key())?),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let group = ParallelGroup::new(THINK_TANK_GROUP, members)?.with_description(
            "Runs the specialist personas in parallel for a multi-perspective analysis.",
        );

        let output_keys: Vec<String> = roster.iter().map(ThinkTankPersona::output_key).collect();
        let contributors: Vec<(&str, &str)> = roster
            .iter()
            .zip(&output_keys)
            .map(|(persona, key)| (persona.display_name(), key.as_str()))
            .collect();
        let synthesizer = catalog.apply_model(
            PersonaDescriptor::new(SYNTHESIZER_AGENT, ThinkTankPrompt::synthesizer(&contributors))?
                .with_description(
                    "Consolidates the specialist outputs, resolves conflicts and writes the executive plan.",
                )
                .with_output_key(StateKey::new(keys::SYNTHESIS_OUTPUT)?),
        );

        let facilitator = SequentialPipeline::new(
            FACILITATOR_PIPELINE,
            vec![group.into(), synthesizer.into()],
        )?
        .with_description("Coordinates the parallel personas and the synthesizer.");

        Ok(Self {
            clarification,
            facilitator: facilitator.into(),
            roster: roster.to_vec(),
        })
    }

    /// Check both halves of the run against the seed keys.
    ///
    /// The coordinator provides `user_request` before clarification and
    /// `clarification_questions` / `clarification_answers` before resuming.
    pub fn validate(&self, seed_keys: &BTreeSet<StateKey>) -> Result<(), CompositionError> {
        let mut available = seed_keys.clone();
        available.insert(StateKey::new(keys::USER_REQUEST)?);
        let after_clarify = Stage::Persona(self.clarification.clone()).validate(&available)?;

        let mut resumed = after_clarify;
        resumed.insert(StateKey::new(keys::CLARIFICATION_QUESTIONS)?);
        resumed.insert(StateKey::new(keys::CLARIFICATION_ANSWERS)?);
        self.facilitator.validate(&resumed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Model;

    fn seed() -> BTreeSet<StateKey> {
        [keys::USER_LANGUAGE, keys::USER_NAME]
            .iter()
            .map(|k| StateKey::new(*k).unwrap())
            .collect()
    }

    #[test]
    fn test_default_think_tank_validates() {
        let think_tank = AgentCatalog::default()
            .think_tank(&ThinkTankPersona::default_roster())
            .unwrap();
        think_tank.validate(&seed()).unwrap();
        assert_eq!(think_tank.facilitator.personas().len(), 7);
    }

    #[test]
    fn test_missing_language_seed_is_rejected() {
        let think_tank = AgentCatalog::default()
            .think_tank(&ThinkTankPersona::default_roster())
            .unwrap();
        assert!(matches!(
            think_tank.validate(&BTreeSet::new()),
            Err(CompositionError::UnknownPlaceholder { ref key, .. }) if key == "user_language"
        ));
    }

    #[test]
    fn test_clarification_output_is_distinct_from_parsed_questions() {
        let think_tank = AgentCatalog::default()
            .think_tank(&[ThinkTankPersona::Mckinsey])
            .unwrap();
        assert_eq!(
            think_tank.clarification.output_key().map(StateKey::as_str),
            Some(keys::CLARIFICATION_OUTPUT)
        );
        assert!(
            think_tank
                .facilitator
                .output_keys()
                .iter()
                .all(|key| key.as_str() != keys::CLARIFICATION_QUESTIONS)
        );
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        assert_eq!(
            AgentCatalog::default().think_tank(&[]).unwrap_err(),
            CompositionError::EmptyGroup(THINK_TANK_GROUP.to_string())
        );
    }

    #[test]
    fn test_model_override_applies_to_named_agent() {
        let catalog = AgentCatalog::default().with_override(SYNTHESIZER_AGENT, Model::Gemini25Pro);
        let think_tank = catalog.think_tank(&[ThinkTankPersona::Mckinsey]).unwrap();
        let personas = think_tank.facilitator.personas();
        assert_eq!(personas[0].model(), None);
        assert_eq!(personas[1].model(), Some(&Model::Gemini25Pro));
    }
}
