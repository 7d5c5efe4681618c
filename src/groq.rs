//! Groq client configuration with sensible defaults.
//!
//! Groq exposes an OpenAI-compatible endpoint, so the async-openai client is
//! pointed at it with a custom base URL. The client is constructed once at
//! process start and passed by reference to every call site.

use crate::config::{AnalysisSettings, Credentials};
use crate::error::RedpulseError;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::Client;
use std::time::Duration;

/// Groq's OpenAI-compatible API base.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Shared chat-completion client handle.
pub type GroqClient = Client<OpenAIConfig>;

/// Create a Groq client with configured timeout.
pub fn create_client(credentials: &Credentials, settings: &AnalysisSettings) -> GroqClient {
    create_client_with_timeout(
        credentials,
        Duration::from_secs(settings.request_timeout_secs),
    )
}

/// Create a Groq client with a custom timeout.
pub fn create_client_with_timeout(credentials: &Credentials, timeout: Duration) -> GroqClient {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let config = OpenAIConfig::new()
        .with_api_base(GROQ_API_BASE)
        .with_api_key(credentials.groq_api_key.clone());

    Client::with_config(config).with_http_client(http_client)
}

/// Convert a provider error into the library taxonomy.
///
/// Overload detection happens here, exactly once: retry eligibility
/// downstream is a structural property of the error, never a text match.
pub fn classify_api_error(err: OpenAIError) -> RedpulseError {
    if let OpenAIError::ApiError(ref api) = err {
        let message = api.message.to_ascii_lowercase();
        if message.contains("overloaded") || message.contains("over capacity") {
            return RedpulseError::Overloaded(api.message.clone());
        }
    }
    RedpulseError::Groq(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(message: &str) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: None,
            param: None,
            code: None,
        })
    }

    #[test]
    fn test_overloaded_classified_as_transient() {
        let err = classify_api_error(api_error("Service Overloaded, try again later"));
        assert!(err.is_overloaded());
    }

    #[test]
    fn test_other_api_errors_not_transient() {
        let err = classify_api_error(api_error("invalid model id"));
        assert!(!err.is_overloaded());
        assert!(matches!(err, RedpulseError::Groq(_)));
    }
}
