//! Deep `{{placeholder}}` substitution over JSON values.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use super::variables::Variables;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([a-zA-Z][a-zA-Z0-9_-]*)\}\}").unwrap();
}

/// Replace `{{identifier}}` tokens in every string of `value`.
///
/// Arrays and objects are walked recursively. Object keys, numbers, booleans
/// and `null` pass through untouched. Unresolved tokens are left intact.
pub fn substitute_placeholders(value: &Value, vars: &Variables) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_str(s, vars)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_placeholders(item, vars))
                .collect(),
        ),
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(key, val)| (key.clone(), substitute_placeholders(val, vars)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Replace `{{identifier}}` tokens in a single string.
pub fn substitute_str(template: &str, vars: &Variables) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Identifiers referenced by placeholders in `template`, in order of appearance.
pub fn placeholder_keys(template: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let key = caps[1].to_string();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
