//! Error types for the application

use thiserror::Error;

/// Result type alias using our AlerterError
pub type Result<T> = std::result::Result<T, AlerterError>;

/// Main error type for alerter operations
#[derive(Error, Debug)]
pub enum AlerterError {
    /// Price source or notifier transport errors (timeouts, connection loss)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Well-formed HTTP exchange but unusable payload
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Malformed price data (non-positive or unparseable values)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// State file read/write errors
    #[error("State persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Notification delivery failed after state was already committed
    #[error("Notification delivery error: {0}")]
    Notification(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AlerterError {
    /// Whether the error is expected to clear on its own by the next
    /// scheduled tick. Transient errors abort only the current cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, AlerterError::Transport(_))
    }
}
