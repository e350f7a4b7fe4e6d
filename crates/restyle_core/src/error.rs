//! Core error types

use thiserror::Error;

/// Errors raised while building modifier groups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Two fields in one group share a local name
    #[error("group '{group}' declares field '{field}' more than once")]
    DuplicateField { group: String, field: String },

    /// A group was declared without any fields
    #[error("group '{0}' has no fields")]
    EmptyGroup(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
