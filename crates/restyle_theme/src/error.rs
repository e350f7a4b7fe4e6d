//! Editor error types

use restyle_core::{ControlId, CoreError};
use std::path::PathBuf;
use thiserror::Error;

use crate::transport::Method;

/// Construction-time configuration errors. Required options never default.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required option is missing or empty
    #[error("missing required option '{0}'")]
    MissingRequired(&'static str),

    /// An option holds a value the editor cannot use
    #[error("invalid option '{option}': {reason}")]
    Invalid {
        option: &'static str,
        reason: String,
    },

    /// A multi-instance schema was instantiated without its variant
    #[error("schema '{schema}' has several instances and requires a variant")]
    MissingDiscriminator { schema: String },

    /// The requested variant is not declared by the schema
    #[error("schema '{schema}' has no variant '{variant}'")]
    UnknownVariant { schema: String, variant: String },

    /// Two groups were registered under one name
    #[error("group '{0}' registered more than once")]
    DuplicateGroup(String),

    #[error(transparent)]
    Group(#[from] CoreError),

    /// Failed to read a configuration file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file
    #[error("failed to parse editor config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised while reading external theme data
#[derive(Error, Debug)]
pub enum ImportError {
    /// The content is not valid JSON
    #[error("malformed theme data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The top-level value is not an object
    #[error("theme data must be a JSON object")]
    NotAnObject,

    /// A variable maps to an array, object or null
    #[error("unsupported value for '{0}': expected a string, number or boolean")]
    UnsupportedValue(String),

    /// A versioned envelope carries a version this build cannot read
    #[error("unsupported theme format version {0}")]
    UnsupportedVersion(u64),
}

/// Failures reported by a persistence transport. The editor never retries.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The destination rejected the request
    #[error("{method} {url} failed: {reason}")]
    Rejected {
        method: Method,
        url: String,
        reason: String,
    },

    /// Nothing found at the given location
    #[error("nothing found at {0}")]
    NotFound(String),

    /// I/O failure while talking to the destination
    #[error("{url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by editor operations. None of them leave the editor in
/// a partially updated state.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    #[error("group '{group}' has no field '{field}'")]
    UnknownField { group: String, field: String },

    #[error("{0} is not bound to any modifier")]
    UnboundControl(ControlId),

    #[error("no compiled output available yet")]
    NoOutput,
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
