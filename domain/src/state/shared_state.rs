//! Shared State: the key-value context accumulated across one run.

use super::key::StateKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mutable mapping from [`StateKey`] to JSON values.
///
/// Values are plain strings for text outputs and JSON objects for structured
/// outputs. Cloning produces the immutable snapshot handed to parallel
/// members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedState {
    entries: BTreeMap<StateKey, Value>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from `(key, value)` pairs, e.g. session seed facts.
    pub fn seeded<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (StateKey, V)>,
        V: Into<Value>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a value only if it is stored as a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Render a value as instruction text.
    ///
    /// Strings are inserted verbatim; other JSON values are serialized.
    pub fn render_value(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the previous one if the key existed.
    pub fn insert(&mut self, key: StateKey, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key, value.into())
    }

    /// Remove a value, returning it if the key existed.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(StateKey, Value)> for SharedState {
    fn from_iter<T: IntoIterator<Item = (StateKey, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
