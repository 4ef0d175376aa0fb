//! Instruction templates with `{key}` placeholders bound to Shared State.
//!
//! A placeholder is any brace-delimited run whose trimmed content is a valid
//! [`StateKey`], optionally suffixed with `?` to mark it optional:
//!
//! ```text
//! Date {todays_date}          required, must be in state
//! Tone: {user_preferences?}   optional, renders empty when absent
//! { "date": "..." }           not a key, left untouched
//! ```

use super::key::StateKey;
use super::shared_state::SharedState;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{+[^{}]*\}+").expect("placeholder pattern is valid"));

/// A state reference found in an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub key: StateKey,
    pub optional: bool,
}

impl Placeholder {
    fn parse(matched: &str) -> Option<Self> {
        let inner = matched.trim_matches(|c| c == '{' || c == '}').trim();
        let (name, optional) = match inner.strip_suffix('?') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        StateKey::new(name)
            .ok()
            .map(|key| Self { key, optional })
    }
}

/// Outcome of rendering a template against a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInstruction {
    pub text: String,
    /// Required keys that were absent and passed through literally.
    pub unresolved: Vec<StateKey>,
}

/// Instruction text plus the registry of state keys it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct InstructionTemplate {
    source: String,
    placeholders: Vec<Placeholder>,
}

impl InstructionTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut placeholders: Vec<Placeholder> = Vec::new();
        for matched in PLACEHOLDER.find_iter(&source) {
            if let Some(placeholder) = Placeholder::parse(matched.as_str())
                && !placeholders.contains(&placeholder)
            {
                placeholders.push(placeholder);
            }
        }
        Self {
            source,
            placeholders,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Keys that must be present for the instruction to render fully.
    pub fn required_keys(&self) -> impl Iterator<Item = &StateKey> {
        self.placeholders
            .iter()
            .filter(|p| !p.optional)
            .map(|p| &p.key)
    }

    /// Substitute placeholders from `state`.
    ///
    /// Missing required keys stay in the text as written and are reported in
    /// [`RenderedInstruction::unresolved`]; missing optional keys render empty.
    pub fn render(&self, state: &SharedState) -> RenderedInstruction {
        let mut unresolved = Vec::new();
        let text = PLACEHOLDER
            .replace_all(&self.source, |caps: &regex::Captures<'_>| {
                let matched = &caps[0];
                let Some(placeholder) = Placeholder::parse(matched) else {
                    return matched.to_string();
                };
                match state.render_value(placeholder.key.as_str()) {
                    Some(value) => value,
                    None if placeholder.optional => String::new(),
                    None => {
                        if !unresolved.contains(&placeholder.key) {
                            unresolved.push(placeholder.key);
                        }
                        matched.to_string()
                    }
                }
            })
            .into_owned();
        RenderedInstruction { text, unresolved }
    }
}

impl From<String> for InstructionTemplate {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for InstructionTemplate {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<InstructionTemplate> for String {
    fn from(template: InstructionTemplate) -> Self {
        template.source
    }
}
