//! Theme file encoding
//!
//! Themes are stored as a flat JSON object mapping variable names to
//! already-suffixed values:
//!
//! ```json
//! { "@brand-primary": "#428bca", "@navbar-height": "60px" }
//! ```
//!
//! A versioned envelope, `{"version": 1, "variables": {...}}`, is also
//! read, and written when [`ExportFormat::Versioned`] is requested.

use restyle_core::OverrideMap;
use serde_json::{Map, Value};

use crate::error::ImportError;

/// Highest envelope version this build reads and the one it writes
pub const FORMAT_VERSION: u64 = 1;

/// Shape of exported theme JSON
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain `variable -> value` object
    #[default]
    Flat,
    /// `{"version": N, "variables": {...}}`
    Versioned,
}

/// Parse theme JSON into an override map.
///
/// Numbers and booleans are accepted and stringified. Nothing is returned
/// unless the whole document is valid.
pub fn parse_theme(text: &str) -> Result<OverrideMap, ImportError> {
    let Value::Object(root) = serde_json::from_str::<Value>(text)? else {
        return Err(ImportError::NotAnObject);
    };

    let variables = match (root.get("version"), root.get("variables")) {
        (Some(version), Some(Value::Object(variables))) => {
            let version = version.as_u64().unwrap_or(u64::MAX);
            if version > FORMAT_VERSION {
                return Err(ImportError::UnsupportedVersion(version));
            }
            variables
        }
        _ => &root,
    };

    variables
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(ImportError::UnsupportedValue(name.clone()))
                }
            };
            Ok((name.clone(), value))
        })
        .collect()
}

/// Encode an override map as theme JSON
pub fn serialize_theme(overrides: &OverrideMap, format: ExportFormat) -> String {
    let variables: Map<String, Value> = overrides
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    match format {
        ExportFormat::Flat => Value::Object(variables).to_string(),
        ExportFormat::Versioned => {
            let mut envelope = Map::new();
            envelope.insert("version".to_string(), Value::from(FORMAT_VERSION));
            envelope.insert("variables".to_string(), Value::Object(variables));
            Value::Object(envelope).to_string()
        }
    }
}
