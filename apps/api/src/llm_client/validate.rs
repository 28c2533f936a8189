//! Structural validation of parsed payloads against per-task shape contracts.
//!
//! Checks presence, type and minimum size only. Content quality is not judged here.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::llm_client::error::GenerationError;

/// A single structural requirement on a dotted path (`"keywords.main"`).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Path must hold a JSON object.
    Object { path: &'static str },
    /// Path must hold a string with at least `min_chars` non-whitespace-trimmed chars.
    Text { path: &'static str, min_chars: usize },
    /// Path must hold an array with at least `min_items` entries.
    Array {
        path: &'static str,
        min_items: usize,
        label: &'static str,
    },
    /// Like `Array`, and every entry must be a non-empty string of at most `max_chars`.
    StringItems {
        path: &'static str,
        min_items: usize,
        max_chars: usize,
        label: &'static str,
    },
    /// Path must hold a number within `[min, max]`.
    Number {
        path: &'static str,
        min: f64,
        max: f64,
    },
    /// Path must hold a non-empty JSON object (a map).
    NonEmptyMap {
        path: &'static str,
        label: &'static str,
    },
}

/// The minimal shape a task's canonical payload must have.
#[derive(Debug, Clone, Default)]
pub struct ShapeContract {
    rules: Vec<FieldRule>,
}

impl ShapeContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn object(self, path: &'static str) -> Self {
        self.rule(FieldRule::Object { path })
    }

    pub fn text(self, path: &'static str, min_chars: usize) -> Self {
        self.rule(FieldRule::Text { path, min_chars })
    }

    pub fn array(self, path: &'static str, min_items: usize, label: &'static str) -> Self {
        self.rule(FieldRule::Array {
            path,
            min_items,
            label,
        })
    }

    pub fn string_items(
        self,
        path: &'static str,
        min_items: usize,
        max_chars: usize,
        label: &'static str,
    ) -> Self {
        self.rule(FieldRule::StringItems {
            path,
            min_items,
            max_chars,
            label,
        })
    }

    pub fn number(self, path: &'static str, min: f64, max: f64) -> Self {
        self.rule(FieldRule::Number { path, min, max })
    }

    pub fn non_empty_map(self, path: &'static str, label: &'static str) -> Self {
        self.rule(FieldRule::NonEmptyMap { path, label })
    }

    /// Checks every rule in declaration order and reports the first violation.
    pub fn check(&self, value: &Value) -> Result<(), GenerationError> {
        self.rules
            .iter()
            .try_for_each(|rule| check_rule(rule, value).map_err(GenerationError::ValidationFailed))
    }
}

/// Checks `value` against `contract` and deserializes it into the typed record.
pub fn validate<T: DeserializeOwned>(
    contract: &ShapeContract,
    value: Value,
) -> Result<T, GenerationError> {
    contract.check(&value)?;
    serde_json::from_value(value)
        .map_err(|e| GenerationError::ValidationFailed(format!("unexpected result shape: {e}")))
}

/// Resolves a dotted path. Empty path means the root.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |node, key| node.get(key))
}

fn check_rule(rule: &FieldRule, root: &Value) -> Result<(), String> {
    let path = rule_path(rule);
    let Some(value) = lookup(root, path).filter(|v| !v.is_null()) else {
        return Err(format!("missing required field `{path}`"));
    };

    match rule {
        FieldRule::Object { .. } => value
            .is_object()
            .then_some(())
            .ok_or_else(|| format!("`{path}` must be an object")),

        FieldRule::Text { min_chars, .. } => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("`{path}` must be a string"))?;
            let len = text.trim().chars().count();
            if len == 0 {
                Err(format!("`{path}` is empty"))
            } else if len < *min_chars {
                Err(format!("`{path}` must be at least {min_chars} characters"))
            } else {
                Ok(())
            }
        }

        FieldRule::Array {
            min_items, label, ..
        } => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("`{path}` must be a list"))?;
            check_cardinality(items.len(), *min_items, label)
        }

        FieldRule::StringItems {
            min_items,
            max_chars,
            label,
            ..
        } => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("`{path}` must be a list"))?;
            check_cardinality(items.len(), *min_items, label)?;
            for (i, item) in items.iter().enumerate() {
                let text = item
                    .as_str()
                    .ok_or_else(|| format!("entry {i} of `{path}` must be a string"))?;
                let len = text.trim().chars().count();
                if len == 0 {
                    return Err(format!("entry {i} of `{path}` is empty"));
                }
                if len > *max_chars {
                    return Err(format!(
                        "entry {i} of `{path}` is longer than {max_chars} characters"
                    ));
                }
            }
            Ok(())
        }

        FieldRule::Number { min, max, .. } => {
            let n = value
                .as_f64()
                .ok_or_else(|| format!("`{path}` must be a number"))?;
            if n < *min || n > *max {
                Err(format!("`{path}` must be between {min} and {max} (got {n})"))
            } else {
                Ok(())
            }
        }

        FieldRule::NonEmptyMap { label, .. } => {
            let map = value
                .as_object()
                .ok_or_else(|| format!("`{path}` must be an object"))?;
            if map.is_empty() {
                Err(format!("no {label}"))
            } else {
                Ok(())
            }
        }
    }
}

fn check_cardinality(len: usize, min_items: usize, label: &str) -> Result<(), String> {
    if len < min_items {
        Err(format!("fewer than {min_items} {label} (got {len})"))
    } else {
        Ok(())
    }
}

fn rule_path(rule: &FieldRule) -> &'static str {
    match rule {
        FieldRule::Object { path }
        | FieldRule::Text { path, .. }
        | FieldRule::Array { path, .. }
        | FieldRule::StringItems { path, .. }
        | FieldRule::Number { path, .. }
        | FieldRule::NonEmptyMap { path, .. } => *path,
    }
}
