//! Stage tree: the closed set of composable stage kinds.
//!
//! A [`Stage`] is either a single persona, a [`ParallelGroup`] of personas
//! sharing one state snapshot, or a [`SequentialPipeline`] of nested stages.
//! Trees are immutable once built and are checked with [`Stage::validate`]
//! before the first run.

use crate::core::error::CompositionError;
use crate::persona::descriptor::PersonaDescriptor;
use crate::state::key::StateKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Discriminant of a [`Stage`], used in events and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Persona,
    Parallel,
    Sequential,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Persona => "persona",
            StageKind::Parallel => "parallel",
            StageKind::Sequential => "sequential",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personas invoked concurrently against the same state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelGroup {
    name: String,
    description: String,
    members: Vec<PersonaDescriptor>,
}

impl ParallelGroup {
    pub fn new(
        name: impl Into<String>,
        members: Vec<PersonaDescriptor>,
    ) -> Result<Self, CompositionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CompositionError::EmptyName);
        }
        if members.is_empty() {
            return Err(CompositionError::EmptyGroup(name));
        }
        Ok(Self {
            name,
            description: String::new(),
            members,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn members(&self) -> &[PersonaDescriptor] {
        &self.members
    }
}

/// Stages run strictly in order, each seeing all earlier writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialPipeline {
    name: String,
    description: String,
    stages: Vec<Stage>,
}

impl SequentialPipeline {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Result<Self, CompositionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CompositionError::EmptyName);
        }
        if stages.is_empty() {
            return Err(CompositionError::EmptyPipeline(name));
        }
        Ok(Self {
            name,
            description: String::new(),
            stages,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

/// One node of the composition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    Persona(PersonaDescriptor),
    Parallel(ParallelGroup),
    Sequential(SequentialPipeline),
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Stage::Persona(persona) => persona.name(),
            Stage::Parallel(group) => group.name(),
            Stage::Sequential(pipeline) => pipeline.name(),
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Persona(_) => StageKind::Persona,
            Stage::Parallel(_) => StageKind::Parallel,
            Stage::Sequential(_) => StageKind::Sequential,
        }
    }

    /// Every output key written anywhere in this subtree, in tree order
    pub fn output_keys(&self) -> Vec<&StateKey> {
        match self {
            Stage::Persona(persona) => persona.output_key().into_iter().collect(),
            Stage::Parallel(group) => group
                .members()
                .iter()
                .filter_map(PersonaDescriptor::output_key)
                .collect(),
            Stage::Sequential(pipeline) => pipeline
                .stages()
                .iter()
                .flat_map(Stage::output_keys)
                .collect(),
        }
    }

    /// Every persona in this subtree, in tree order
    pub fn personas(&self) -> Vec<&PersonaDescriptor> {
        match self {
            Stage::Persona(persona) => vec![persona],
            Stage::Parallel(group) => group.members().iter().collect(),
            Stage::Sequential(pipeline) => {
                pipeline.stages().iter().flat_map(Stage::personas).collect()
            }
        }
    }

    /// Check the key bindings of this tree against the keys available up front.
    ///
    /// Returns the keys available after the tree has run. Fails when an
    /// instruction requires a key that neither `available` nor an earlier
    /// stage provides, when an output key is written twice, or when a
    /// parallel member has no output key.
    pub fn validate(
        &self,
        available: &BTreeSet<StateKey>,
    ) -> Result<BTreeSet<StateKey>, CompositionError> {
        match self {
            Stage::Persona(persona) => validate_persona(persona, available),
            Stage::Parallel(group) => {
                let mut after = available.clone();
                for member in group.members() {
                    if member.output_key().is_none() {
                        return Err(CompositionError::MissingOutputKey {
                            stage: member.name().to_string(),
                        });
                    }
                    // Members see the snapshot, never each other's writes
                    let produced = validate_persona(member, available)?;
                    for key in produced.difference(available) {
                        if !after.insert(key.clone()) {
                            return Err(CompositionError::DuplicateOutputKey {
                                stage: member.name().to_string(),
                                key: key.to_string(),
                            });
                        }
                    }
                }
                Ok(after)
            }
            Stage::Sequential(pipeline) => {
                let mut current = available.clone();
                for stage in pipeline.stages() {
                    current = stage.validate(&current)?;
                }
                Ok(current)
            }
        }
    }
}

fn validate_persona(
    persona: &PersonaDescriptor,
    available: &BTreeSet<StateKey>,
) -> Result<BTreeSet<StateKey>, CompositionError> {
    if let Some(missing) = persona
        .instruction()
        .required_keys()
        .find(|key| !available.contains(*key))
    {
        return Err(CompositionError::UnknownPlaceholder {
            stage: persona.name().to_string(),
            key: missing.to_string(),
        });
    }

    let mut after = available.clone();
    if let Some(key) = persona.output_key()
        && !after.insert(key.clone())
    {
        return Err(CompositionError::DuplicateOutputKey {
            stage: persona.name().to_string(),
            key: key.to_string(),
        });
    }
    Ok(after)
}

impl From<PersonaDescriptor> for Stage {
    fn from(persona: PersonaDescriptor) -> Self {
        Stage::Persona(persona)
    }
}

impl From<ParallelGroup> for Stage {
    fn from(group: ParallelGroup) -> Self {
        Stage::Parallel(group)
    }
}

impl From<SequentialPipeline> for Stage {
    fn from(pipeline: SequentialPipeline) -> Self {
        Stage::Sequential(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> StateKey {
        StateKey::new(name).unwrap()
    }

    fn persona(name: &str, instruction: &str, output: Option<&str>) -> PersonaDescriptor {
        let persona = PersonaDescriptor::new(name, instruction).unwrap();
        match output {
            Some(output) => persona.with_output_key(key(output)),
            None => persona,
        }
    }

    fn seed(keys: &[&str]) -> BTreeSet<StateKey> {
        keys.iter().map(|k| key(k)).collect()
    }

    // ==================== Construction ====================

    #[test]
    fn test_empty_group_and_pipeline_rejected() {
        assert_eq!(
            ParallelGroup::new("think_tank", vec![]).unwrap_err(),
            CompositionError::EmptyGroup("think_tank".to_string())
        );
        assert_eq!(
            SequentialPipeline::new("facilitator", vec![]).unwrap_err(),
            CompositionError::EmptyPipeline("facilitator".to_string())
        );
    }

    #[test]
    fn test_output_keys_in_tree_order() {
        let group = ParallelGroup::new(
            "g",
            vec![persona("a", "", Some("a_output")), persona("b", "", Some("b_output"))],
        )
        .unwrap();
        let pipeline = SequentialPipeline::new(
            "p",
            vec![group.into(), persona("s", "", Some("s_output")).into()],
        )
        .unwrap();
        let stage = Stage::from(pipeline);
        let keys: Vec<&str> = stage.output_keys().iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a_output", "b_output", "s_output"]);
        assert_eq!(stage.personas().len(), 3);
        assert_eq!(stage.kind(), StageKind::Sequential);
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_sequential_threads_keys_forward() {
        let pipeline = SequentialPipeline::new(
            "p",
            vec![
                persona("first", "Answer {user_request}", Some("draft")).into(),
                persona("second", "Improve {draft}", Some("final")).into(),
            ],
        )
        .unwrap();
        let after = Stage::from(pipeline).validate(&seed(&["user_request"])).unwrap();
        assert!(after.contains("draft"));
        assert!(after.contains("final"));
    }

    #[test]
    fn test_validate_unknown_placeholder() {
        let stage = Stage::from(persona("synth", "Merge {mckinsey_output}", None));
        assert_eq!(
            stage.validate(&seed(&[])).unwrap_err(),
            CompositionError::UnknownPlaceholder {
                stage: "synth".to_string(),
                key: "mckinsey_output".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_optional_placeholder_not_required() {
        let stage = Stage::from(persona("p", "Style: {user_preferences?}", None));
        assert!(stage.validate(&seed(&[])).is_ok());
    }

    #[test]
    fn test_validate_parallel_members_cannot_read_siblings() {
        let group = ParallelGroup::new(
            "g",
            vec![
                persona("a", "", Some("a_output")),
                persona("b", "Build on {a_output}", Some("b_output")),
            ],
        )
        .unwrap();
        assert!(matches!(
            Stage::from(group).validate(&seed(&[])),
            Err(CompositionError::UnknownPlaceholder { ref stage, .. }) if stage == "b"
        ));
    }

    #[test]
    fn test_validate_parallel_duplicate_output_key() {
        let group = ParallelGroup::new(
            "g",
            vec![persona("a", "", Some("shared")), persona("b", "", Some("shared"))],
        )
        .unwrap();
        assert_eq!(
            Stage::from(group).validate(&seed(&[])).unwrap_err(),
            CompositionError::DuplicateOutputKey {
                stage: "b".to_string(),
                key: "shared".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_parallel_member_needs_output_key() {
        let group = ParallelGroup::new("g", vec![persona("a", "", None)]).unwrap();
        assert_eq!(
            Stage::from(group).validate(&seed(&[])).unwrap_err(),
            CompositionError::MissingOutputKey {
                stage: "a".to_string()
            }
        );
    }

    #[test]
    fn test_validate_output_key_colliding_with_seed() {
        let stage = Stage::from(persona("p", "", Some("user_email")));
        assert!(matches!(
            stage.validate(&seed(&["user_email"])),
            Err(CompositionError::DuplicateOutputKey { .. })
        ));
    }

    #[test]
    fn test_stage_serializes_with_kind_tag() {
        let stage = Stage::from(persona("p", "Hi", Some("out")));
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["kind"], "persona");
        assert_eq!(json["name"], "p");
    }
}
