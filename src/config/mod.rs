//! Configuration module for Redpulse.
//!
//! Handles application settings, environment credentials, and prompt
//! templates.

mod prompts;
mod settings;

pub use prompts::{cutoff_date, AgentPrompts, FallbackPrompts, Prompts};
pub use settings::{
    AnalysisSettings, Credentials, GeneralSettings, McpSettings, PacingSettings, RetrySettings,
    Settings,
};
