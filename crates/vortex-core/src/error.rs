//! Error types for the Vortex pipeline

use thiserror::Error;

/// Main error type for all Vortex operations
#[derive(Error, Debug)]
pub enum VortexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Secret '{0}' is not configured")]
    SecretNotConfigured(String),

    #[error("AI response violated the content contract: {0}")]
    AiContract(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Store operation failed: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl VortexError {
    /// Whether this error disables a whole operation class rather than
    /// marking one item as failed. Missing secrets fall in this bucket: the
    /// capability is off, items stay untouched and re-driveable.
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, Self::SecretNotConfigured(_))
    }
}

/// Result type for Vortex operations
pub type Result<T> = std::result::Result<T, VortexError>;
