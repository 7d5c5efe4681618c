//! Configuration settings for Redpulse.
//!
//! Tunables come from an optional TOML file; credentials always come from
//! the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub analysis: AnalysisSettings,
    pub pacing: PacingSettings,
    pub retry: RetrySettings,
    pub mcp: McpSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Model and prompt settings for topic analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Chat model to use on the Groq endpoint.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Only discuss posts newer than this many days.
    pub lookback_days: u32,
    /// Maximum LLM round-trips per topic in the agent loop.
    pub max_iterations: usize,
    /// Request timeout for Groq calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.3,
            lookback_days: 14,
            max_iterations: 15,
            request_timeout_secs: 300,
        }
    }
}

/// Inter-call pacing settings.
///
/// The batch loop is strictly sequential; these delays keep the run well
/// under provider rate limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// Pause after each topic on the tool-augmented path, in seconds.
    pub agent_pause_secs: u64,
    /// Pause after each topic on the fallback path, in seconds.
    pub fallback_pause_secs: u64,
    /// Minimum spacing between tool-augmented invocations, in seconds.
    pub tool_window_secs: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            agent_pause_secs: 5,
            fallback_pause_secs: 2,
            tool_window_secs: 15,
        }
    }
}

impl PacingSettings {
    pub fn agent_pause(&self) -> Duration {
        Duration::from_secs(self.agent_pause_secs)
    }

    pub fn fallback_pause(&self) -> Duration {
        Duration::from_secs(self.fallback_pause_secs)
    }

    pub fn tool_window(&self) -> Duration {
        Duration::from_secs(self.tool_window_secs)
    }
}

/// Backoff settings for overloaded-provider retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// First backoff wait, in seconds.
    pub base_delay_secs: u64,
    /// Cap on any single backoff wait, in seconds.
    pub max_delay_secs: u64,
    /// Multiplier applied per attempt.
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 15,
            max_delay_secs: 60,
            multiplier: 2.0,
        }
    }
}

/// MCP tool server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpSettings {
    /// Command used to launch the tool server.
    pub command: String,
    /// Arguments passed to the command.
    pub args: Vec<String>,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec!["-y".to_string(), "@brightdata/mcp".to_string()],
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("redpulse")
            .join("config.toml")
    }
}

/// API credentials, always sourced from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Groq API key. Required.
    pub groq_api_key: String,
    /// Bright Data token for the MCP tool server. Optional; without it the
    /// tool server will refuse the session and the run degrades to fallback.
    pub api_token: Option<String>,
    /// Bright Data web unlocker zone. Optional, same degradation.
    pub web_unlocker_zone: Option<String>,
}

impl Credentials {
    /// Read credentials from process environment variables.
    ///
    /// Fails with a configuration error if `GROQ_API_KEY` is unset; this is
    /// checked before any network activity.
    pub fn from_env() -> crate::error::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> crate::error::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let groq_api_key = lookup("GROQ_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                crate::error::RedpulseError::Config(
                    "GROQ_API_KEY environment variable is not set".to_string(),
                )
            })?;

        Ok(Self {
            groq_api_key,
            api_token: lookup("API_TOKEN").filter(|v| !v.is_empty()),
            web_unlocker_zone: lookup("WEB_UNLOCKER_ZONE").filter(|v| !v.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.analysis.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.analysis.lookback_days, 14);
        assert_eq!(settings.pacing.tool_window_secs, 15);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.mcp.command, "npx");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = PathBuf::from("/nonexistent/redpulse-config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.retry.base_delay_secs, 15);
    }

    #[test]
    fn test_load_from_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[analysis]\nmodel = \"llama-3.1-8b-instant\"\n[pacing]\nagent_pause_secs = 1\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.analysis.model, "llama-3.1-8b-instant");
        assert_eq!(settings.pacing.agent_pause_secs, 1);
        // Untouched sections keep their defaults.
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn test_credentials_require_groq_key() {
        let err = Credentials::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, crate::error::RedpulseError::Config(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_credentials_empty_key_rejected() {
        let err = Credentials::from_lookup(|key| {
            (key == "GROQ_API_KEY").then(String::new)
        })
        .unwrap_err();
        assert!(matches!(err, crate::error::RedpulseError::Config(_)));
    }

    #[test]
    fn test_credentials_optional_tool_token() {
        let creds = Credentials::from_lookup(|key| {
            (key == "GROQ_API_KEY").then(|| "gsk_test".to_string())
        })
        .unwrap();
        assert_eq!(creds.groq_api_key, "gsk_test");
        assert!(creds.api_token.is_none());
        assert!(creds.web_unlocker_zone.is_none());
    }
}
