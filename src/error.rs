//! Error types for Redpulse.

use thiserror::Error;

/// Library-level error type for Redpulse operations.
#[derive(Error, Debug)]
pub enum RedpulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transient capacity error from the model provider. The only variant
    /// the retry executor is allowed to retry.
    #[error("Service overloaded: {0}")]
    Overloaded(String),

    #[error("Groq API error: {0}")]
    Groq(String),

    #[error("MCP session error: {0}")]
    Mcp(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl RedpulseError {
    /// Whether this error represents a transient overload that may clear
    /// after a backoff wait.
    pub fn is_overloaded(&self) -> bool {
        matches!(self, RedpulseError::Overloaded(_))
    }
}

/// Result type alias for Redpulse operations.
pub type Result<T> = std::result::Result<T, RedpulseError>;
