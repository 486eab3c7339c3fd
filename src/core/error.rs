//! Error types for limgraph

use thiserror::Error;

/// Result type alias using limgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// limgraph error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema violation in {operation} ({node} -> {target}): {reason}")]
    SchemaViolation {
        operation: &'static str,
        node: u32,
        target: u32,
        reason: String,
    },

    #[error("Invalid node id: {id}")]
    InvalidNode { id: u32 },

    #[error("Invalid node kind in {operation}: {kind}")]
    InvalidNodeKind {
        operation: &'static str,
        kind: &'static str,
    },

    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Front-end contract violation: {message}")]
    ContractViolation { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn schema(
        operation: &'static str,
        node: u32,
        target: u32,
        reason: impl Into<String>,
    ) -> Self {
        Error::SchemaViolation {
            operation,
            node,
            target,
            reason: reason.into(),
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::Format {
            message: message.into(),
        }
    }

    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Error::ContractViolation {
            message: message.into(),
        }
    }
}
