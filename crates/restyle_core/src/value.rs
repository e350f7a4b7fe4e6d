//! Modifier values and the flattened override map

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flattened `variable name -> value` map of every non-null modifier.
///
/// Iteration follows insertion order: group registration order, then the
/// field order of each group's table.
pub type OverrideMap = IndexMap<String, String>;

/// A value as entered by a user or a program, before unit suffixing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Interpret control input: numeric text becomes a number, anything else stays text
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => RawValue::Number(n),
            _ => RawValue::Text(input.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(value as f64)
    }
}
