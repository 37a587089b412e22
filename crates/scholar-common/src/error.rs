//! Error types for the shared domain model

use thiserror::Error;

/// Result type alias for scholar-common operations
pub type Result<T> = std::result::Result<T, PortalError>;

/// Main error type for the shared domain model
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown wizard step: {0}")]
    UnknownStep(String),

    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Section '{step}' cannot be edited through a form")]
    NotAForm { step: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
