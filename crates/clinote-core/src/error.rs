//! Error types for the note processing pipeline
//!
//! Content defects in generated notes are never errors; they are reported as
//! data in a [`ValidationResult`](crate::validator::ValidationResult). The
//! variants here cover configuration, I/O and caller-contract failures.

use thiserror::Error;

/// Generic message shown to end users when a response fails validation.
pub const FORMAT_MISMATCH_MESSAGE: &str = "The server response did not match the expected format. \
     Please try again or contact support if the issue persists.";

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum ClinoteError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Schema configuration is malformed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    File(String),

    /// Report serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The generative service returned nothing usable
    #[error("{0}")]
    EmptyResponse(String),

    /// The processed response failed structural validation.
    ///
    /// The display text is deliberately generic; `diagnostics` holds the raw
    /// validator output for operators.
    #[error("{}", FORMAT_MISMATCH_MESSAGE)]
    FormatMismatch { diagnostics: Vec<String> },

    /// Failure reported by the generative service
    #[error("{message}")]
    Service { status: u16, message: String },

    /// Metrics registration or encoding failure
    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl ClinoteError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ClinoteError::InvalidInput(msg.into())
    }

    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        ClinoteError::Schema(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        ClinoteError::Parse(msg.into())
    }

    /// Create a file error
    pub fn file(msg: impl Into<String>) -> Self {
        ClinoteError::File(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ClinoteError::InvalidInput(_)
                | ClinoteError::Schema(_)
                | ClinoteError::Parse(_)
                | ClinoteError::File(_)
        )
    }
}

impl From<std::io::Error> for ClinoteError {
    fn from(err: std::io::Error) -> Self {
        ClinoteError::File(err.to_string())
    }
}

impl From<serde_json::Error> for ClinoteError {
    fn from(err: serde_json::Error) -> Self {
        ClinoteError::Parse(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ClinoteError {
    fn from(err: serde_yaml::Error) -> Self {
        ClinoteError::Parse(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for ClinoteError {
    fn from(err: toml::de::Error) -> Self {
        ClinoteError::Parse(format!("TOML error: {}", err))
    }
}

impl From<regex::Error> for ClinoteError {
    fn from(err: regex::Error) -> Self {
        ClinoteError::Schema(format!("invalid pattern: {}", err))
    }
}

impl From<prometheus::Error> for ClinoteError {
    fn from(err: prometheus::Error) -> Self {
        ClinoteError::Metrics(err.to_string())
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ClinoteError>;
