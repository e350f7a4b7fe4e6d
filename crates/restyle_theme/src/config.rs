//! Editor configuration (restyle.toml)
//!
//! The recognized option set is fixed: unknown keys are rejected so a typo
//! never silently falls back to a default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::transport::Method;

/// Top-level editor configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Cooldown between compiles, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Snapshots kept by the undo history
    #[serde(default = "default_undo_capacity")]
    pub undo_capacity: usize,
    /// Theme loaded when the editor starts
    #[serde(default)]
    pub initial_theme: Option<String>,
    /// Commit a history entry when a value is cleared
    #[serde(default)]
    pub commit_cleared: bool,
    /// Destination for the save path
    #[serde(default)]
    pub save: Option<SaveTarget>,
    /// Export destinations
    #[serde(default)]
    pub export: ExportTarget,
}

fn default_delay_ms() -> u64 {
    750
}

fn default_undo_capacity() -> usize {
    10
}

/// Where and how the save path sends the theme
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SaveTarget {
    pub url: String,
    #[serde(default)]
    pub method: Method,
    /// Name of the host callback to run after a successful save
    #[serde(default)]
    pub callback: Option<String>,
}

/// Export destinations
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportTarget {
    /// Selector every exported CSS rule is scoped under
    #[serde(default)]
    pub css_selector: Option<String>,
    #[serde(default = "default_json_file")]
    pub json_file: String,
    #[serde(default = "default_css_file")]
    pub css_file: String,
}

fn default_json_file() -> String {
    "theme.json".to_string()
}

fn default_css_file() -> String {
    "theme.css".to_string()
}

impl Default for ExportTarget {
    fn default() -> Self {
        Self {
            css_selector: None,
            json_file: default_json_file(),
            css_file: default_css_file(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            undo_capacity: default_undo_capacity(),
            initial_theme: None,
            commit_cleared: false,
            save: None,
            export: ExportTarget::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Fail on empty required fields and unusable values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_capacity == 0 {
            return Err(ConfigError::Invalid {
                option: "undo_capacity",
                reason: "must keep at least one snapshot".to_string(),
            });
        }
        if matches!(self.initial_theme.as_deref(), Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::MissingRequired("initial_theme"));
        }
        if let Some(save) = &self.save {
            if save.url.trim().is_empty() {
                return Err(ConfigError::MissingRequired("save.url"));
            }
            if save.method == Method::Get {
                return Err(ConfigError::Invalid {
                    option: "save.method",
                    reason: "GET cannot carry a theme body".to_string(),
                });
            }
        }
        if self.export.json_file.trim().is_empty() {
            return Err(ConfigError::MissingRequired("export.json_file"));
        }
        if self.export.css_file.trim().is_empty() {
            return Err(ConfigError::MissingRequired("export.css_file"));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            option: "config",
            reason: e.to_string(),
        })
    }
}
