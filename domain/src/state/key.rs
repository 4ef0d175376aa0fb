//! State key value object

use crate::core::error::CompositionError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Prefixes that scope a key beyond the current session.
pub const KEY_PREFIXES: [&str; 3] = ["app:", "user:", "temp:"];

/// A validated Shared State key.
///
/// A key is an identifier (`[A-Za-z_][A-Za-z0-9_]*`), optionally preceded by
/// one of [`KEY_PREFIXES`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey(String);

impl StateKey {
    pub fn new(key: impl Into<String>) -> Result<Self, CompositionError> {
        let key = key.into();
        if Self::is_valid(&key) {
            Ok(Self(key))
        } else {
            Err(CompositionError::InvalidStateKey(key))
        }
    }

    /// Check whether `candidate` would be accepted by [`StateKey::new`].
    pub fn is_valid(candidate: &str) -> bool {
        let name = KEY_PREFIXES
            .iter()
            .find_map(|prefix| candidate.strip_prefix(prefix))
            .unwrap_or(candidate);
        is_identifier(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

impl TryFrom<String> for StateKey {
    type Error = CompositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StateKey {
    type Error = CompositionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.0
    }
}

impl AsRef<str> for StateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
