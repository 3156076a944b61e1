//! Variable value maps used during rendering.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::error::{RenderError, RenderResult};

/// Mapping from variable key to its rendered string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object.
    ///
    /// Strings are used as-is, numbers and booleans via their JSON text,
    /// `null` becomes an empty string and nested values are kept as JSON.
    pub fn from_json(value: &Value) -> RenderResult<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            _ => {
                return Err(RenderError::InvalidVariables(
                    "Variables must be an object".to_string(),
                ))
            }
        };

        Ok(Self::from_map(map))
    }

    /// Build from an already-validated JSON object.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let values = map
            .iter()
            .map(|(key, value)| (key.clone(), value_to_string(value)))
            .collect();

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Layer `overrides` on top of `self`; keys in `overrides` win.
    pub fn merged_with(&self, overrides: &Variables) -> Variables {
        let mut values = self.values.clone();
        for (key, value) in &overrides.values {
            values.insert(key.clone(), value.clone());
        }
        Variables { values }
    }

    /// Resolve a key, falling back to the literal `{{key}}` placeholder.
    pub fn resolve_or_placeholder(&self, key: &str) -> String {
        match self.get(key) {
            Some(value) => value.to_string(),
            None => format!("{{{{{}}}}}", key),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Arrays and objects keep their JSON representation
        _ => value.to_string(),
    }
}
