//! The think tank persona roster

use crate::core::error::CompositionError;
use crate::prompt::personas;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A specialist perspective available to the think tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkTankPersona {
    Mckinsey,
    OrgPsychologist,
    ChangeManagement,
    AimlLead,
    AiEthics,
    UxDesignThinker,
    ScenarioPlanner,
    DebonoHats,
    DevilsAdvocate,
}

impl ThinkTankPersona {
    pub const ALL: [ThinkTankPersona; 9] = [
        ThinkTankPersona::Mckinsey,
        ThinkTankPersona::OrgPsychologist,
        ThinkTankPersona::ChangeManagement,
        ThinkTankPersona::AimlLead,
        ThinkTankPersona::AiEthics,
        ThinkTankPersona::UxDesignThinker,
        ThinkTankPersona::ScenarioPlanner,
        ThinkTankPersona::DebonoHats,
        ThinkTankPersona::DevilsAdvocate,
    ];

    /// Roster used when none is configured
    pub fn default_roster() -> Vec<ThinkTankPersona> {
        vec![
            ThinkTankPersona::Mckinsey,
            ThinkTankPersona::OrgPsychologist,
            ThinkTankPersona::ChangeManagement,
            ThinkTankPersona::ScenarioPlanner,
            ThinkTankPersona::DebonoHats,
            ThinkTankPersona::DevilsAdvocate,
        ]
    }

    /// Agent name, also the prefix of the output key
    pub fn id(&self) -> &'static str {
        match self {
            ThinkTankPersona::Mckinsey => "mckinsey",
            ThinkTankPersona::OrgPsychologist => "org_psychologist",
            ThinkTankPersona::ChangeManagement => "change_management",
            ThinkTankPersona::AimlLead => "aiml_lead",
            ThinkTankPersona::AiEthics => "ai_ethics",
            ThinkTankPersona::UxDesignThinker => "ux_design_thinker",
            ThinkTankPersona::ScenarioPlanner => "scenario_planner",
            ThinkTankPersona::DebonoHats => "debono_hats",
            ThinkTankPersona::DevilsAdvocate => "devils_advocate",
        }
    }

    /// Name used for citations in the final report
    pub fn display_name(&self) -> &'static str {
        match self {
            ThinkTankPersona::Mckinsey => "McKinsey",
            ThinkTankPersona::OrgPsychologist => "Organisational Psychologist",
            ThinkTankPersona::ChangeManagement => "Change Management",
            ThinkTankPersona::AimlLead => "AI/ML Lead",
            ThinkTankPersona::AiEthics => "AI Ethics",
            ThinkTankPersona::UxDesignThinker => "UX Design Thinker",
            ThinkTankPersona::ScenarioPlanner => "Scenario Planner",
            ThinkTankPersona::DebonoHats => "De Bono Hats",
            ThinkTankPersona::DevilsAdvocate => "Devil's Advocate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ThinkTankPersona::Mckinsey => {
                "Strategy consultant applying MECE, issue-tree thinking and 7-S analysis to frame the problem, size opportunities and surface no-regret moves."
            }
            ThinkTankPersona::OrgPsychologist => {
                "Expert in human behaviour and change, revealing cultural blockers, motivation levers and intervention roadmaps."
            }
            ThinkTankPersona::ChangeManagement => {
                "Guides adoption by crafting a compelling change narrative, activating champions and sequencing interventions."
            }
            ThinkTankPersona::AimlLead => {
                "Technical lead defining data strategy, model approach and the MLOps path to production."
            }
            ThinkTankPersona::AiEthics => {
                "Evaluates ethical tensions and societal impact against legal frameworks and human values."
            }
            ThinkTankPersona::UxDesignThinker => {
                "Uncovers user needs and pain points, turning insights into prototype hypotheses and test plans."
            }
            ThinkTankPersona::ScenarioPlanner => {
                "Explores plausible futures, stress-testing strategies against external drivers across 5- and 10-year horizons."
            }
            ThinkTankPersona::DebonoHats => {
                "Applies the Six Thinking Hats to generate balanced viewpoints and organise group thinking."
            }
            ThinkTankPersona::DevilsAdvocate => {
                "Stress-tests proposals by inverting assumptions, spotlighting failure modes and voicing the strongest counterarguments."
            }
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            ThinkTankPersona::Mckinsey => personas::MCKINSEY,
            ThinkTankPersona::OrgPsychologist => personas::ORG_PSYCHOLOGIST,
            ThinkTankPersona::ChangeManagement => personas::CHANGE_MANAGEMENT,
            ThinkTankPersona::AimlLead => personas::AIML_LEAD,
            ThinkTankPersona::AiEthics => personas::AI_ETHICS,
            ThinkTankPersona::UxDesignThinker => personas::UX_DESIGN_THINKER,
            ThinkTankPersona::ScenarioPlanner => personas::SCENARIO_PLANNER,
            ThinkTankPersona::DebonoHats => personas::DEBONO_HATS,
            ThinkTankPersona::DevilsAdvocate => personas::DEVILS_ADVOCATE,
        }
    }

    /// State key the persona writes, `<id>_output`
    pub fn output_key(&self) -> String {
        format!("{}_output", self.id())
    }
}

impl std::fmt::Display for ThinkTankPersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ThinkTankPersona {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ThinkTankPersona::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or_else(|| CompositionError::UnknownPersona(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_roster_has_six_members() {
        let roster = ThinkTankPersona::default_roster();
        assert_eq!(roster.len(), 6);
        assert!(!roster.contains(&ThinkTankPersona::AiEthics));
    }

    #[test]
    fn test_output_keys_are_unique() {
        let keys: HashSet<String> = ThinkTankPersona::ALL.iter().map(|p| p.output_key()).collect();
        assert_eq!(keys.len(), ThinkTankPersona::ALL.len());
    }

    #[test]
    fn test_from_str_roundtrips_ids() {
        for persona in ThinkTankPersona::ALL {
            assert_eq!(persona.id().parse::<ThinkTankPersona>().unwrap(), persona);
        }
        assert_eq!(
            "devils-advocate".parse::<ThinkTankPersona>().unwrap(),
            ThinkTankPersona::DevilsAdvocate
        );
        assert!(matches!(
            "astrologer".parse::<ThinkTankPersona>(),
            Err(CompositionError::UnknownPersona(_))
        ));
    }
}
