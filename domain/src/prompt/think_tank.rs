//! Prompt texts for the think tank flow

/// Templates for the clarification, persona and synthesis stages.
///
/// Instructions reference Shared State keys with `{key}` placeholders; see
/// [`InstructionTemplate`](crate::state::template::InstructionTemplate).
pub struct ThinkTankPrompt;

impl ThinkTankPrompt {
    /// Instruction for the clarification stage
    pub fn clarification() -> &'static str {
        r#"ROLE: Clarifier & Problem-Definition Facilitator

INPUTS:
- user_request: {user_request}

BACKGROUND:
You analyse the user's request and identify what information is missing for the
Think Tank to give a high-quality answer. The Think Tank consists of specialist
personas (strategy, organisational psychology, change management, scenario
planning, Six Thinking Hats, devil's advocate).

TASKS:
1. Analyse `user_request`.
2. Identify the most critical knowledge gaps (max 5) that, if filled, will
   materially improve the Think Tank outputs (scope, success metrics, time
   horizon, context, important details).
3. Formulate 4-5 numbered questions to the user, each asking for one missing
   piece of information.
4. Write the questions in clear, plain language without jargon or leading
   suggestions, in {user_language}.
5. Output only the numbered question list, no explanation or recommendations.

Constraints: exactly 4 or 5 questions, each at most 25 words, no answers or
assumptions, do not request sensitive personal data unless strictly required."#
    }

    /// Instruction for the synthesis stage.
    ///
    /// `contributors` pairs each persona's display name with its output key;
    /// every key becomes a placeholder so the synthesizer sees all outputs.
    pub fn synthesizer(contributors: &[(&str, &str)]) -> String {
        let mut prompt = String::from(
            r#"ROLE: Synthesizer & Conflict Resolver

INPUT: the outputs of all Think Tank personas:
"#,
        );
        for (display_name, output_key) in contributors {
            prompt.push_str(&format!(
                "\n### {}\n{{{}}}\n",
                display_name, output_key
            ));
        }
        prompt.push_str(
            r#"
TASKS:
1. Standardise each persona output into Insights, Recommendations and Risks;
   cite persona names in brackets.
2. Merge overlapping points and label explicit contradictions.
3. If conflicts exist, include a simple trade-off table (max 4 rows).
4. Draft an action plan in an empathetic, second-person voice.
5. List the open questions that still need user input.
"#,
        );
        prompt.push_str(Self::report_contract());
        prompt
    }

    /// Formatting contract of the final report, shared by the synthesizer
    /// and the coordinator
    pub fn report_contract() -> &'static str {
        r#"
OUTPUT CONTRACT:
Write an Executive Plan in {user_language} for {user_name?}. Be well-structured
and conversational, like an empathetic organisational psychologist speaking
directly to the reader. Use short paragraphs and exactly these headings:

**Executive Summary**
**Insights** (persona citations)
**Recommendations** (persona citations)
**Risks & How to Handle Them**
**Next Steps (30/60/90 days)**
**Open Questions**

Constraints: at most 400 words, cite persona names after each fact
(e.g. "(McKinsey)"), no invented data, no new facts beyond the persona
outputs, supportive human tone.
User preferences: {user_preferences?}"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarification_references_request() {
        assert!(ThinkTankPrompt::clarification().contains("{user_request}"));
    }

    #[test]
    fn test_synthesizer_lists_every_contributor_placeholder() {
        let prompt = ThinkTankPrompt::synthesizer(&[
            ("McKinsey Strategy Partner", "mckinsey_output"),
            ("Devil's Advocate", "devils_advocate_output"),
        ]);
        assert!(prompt.contains("{mckinsey_output}"));
        assert!(prompt.contains("{devils_advocate_output}"));
        assert!(prompt.contains("Executive Summary"));
    }
}
