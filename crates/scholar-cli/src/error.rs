//! Error types for the scholar CLI
//!
//! Every variant is user-facing: the message says what went wrong and, where
//! there is one, what to do next.

use crate::documents::DocumentError;
use scholar_common::{FieldErrors, PortalError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The backend answered but reported a failure
    #[error("Server error: {0}")]
    Api(String),

    #[error("Network request failed: {0}. Check your internet connection and server URL.")]
    Http(#[from] reqwest::Error),

    /// A 401 from the backend; stored credentials have already been cleared.
    /// `redirect` is set unless the user was on a public page.
    #[error("Your session has expired. Run 'scholar login' to sign in again.")]
    SessionExpired { redirect: Option<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Login failed: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not logged in. Run 'scholar login' first.")]
    NotLoggedIn,

    #[error("No active application. Run 'scholar apply <scholarship-id>' or pass --application.")]
    NoActiveApplication,

    /// Field-level problems; nothing was sent to the backend
    #[error("Please fix the highlighted fields: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("This application has been submitted and can no longer be changed.")]
    Locked,

    #[error("Cannot open step: {0}")]
    Navigation(String),

    #[error("Interview booking not possible: {0}")]
    Interview(String),

    #[error("Application cannot be submitted yet: {}", .0.join("; "))]
    SubmissionBlocked(Vec<String>),

    #[error("Configuration error: {0}. Check your environment variables or config file.")]
    Config(String),

    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}. Check the file syntax at the indicated line/column.")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}. Check the file syntax.")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse config.toml: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Prompt cancelled: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error(transparent)]
    Common(#[from] PortalError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn navigation(msg: impl Into<String>) -> Self {
        Self::Navigation(msg.into())
    }

    /// Whether the error means the stored login is gone
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_blocked_lists_reasons() {
        let err = CliError::SubmissionBlocked(vec![
            "Step 3 (Education) is incomplete".to_string(),
            "Consent not given".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Application cannot be submitted yet: Step 3 (Education) is incomplete; Consent not given"
        );
    }

    #[test]
    fn test_validation_message_names_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("phone", "Must contain digits only");
        let err = CliError::Validation(errors);
        assert!(err.to_string().contains("phone: Must contain digits only"));
    }

    #[test]
    fn test_session_expired() {
        let err = CliError::SessionExpired {
            redirect: Some("/login?expired=1".to_string()),
        };
        assert!(err.is_session_expired());
        assert!(!CliError::NotLoggedIn.is_session_expired());
    }
}
