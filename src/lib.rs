//! Redpulse - Reddit Discussion Analysis
//!
//! Summarizes recent Reddit discussion for a list of topics using a Groq
//! chat model. The primary path binds the model to live data tools served
//! over MCP (Model Context Protocol); when that session cannot be
//! established, a degraded fallback path asks the model for a representative
//! analysis without live data.
//!
//! # Overview
//!
//! - One shared Groq client, constructed once and passed by reference
//! - A tool calling agent per run, throttled to one tool invocation per
//!   rate window, with backoff retries on provider overload
//! - Strictly sequential topic processing with per-topic failure isolation:
//!   the result mapping always covers every requested topic
//! - An explicit, observable switch to the fallback path when the tool
//!   session fails
//!
//! # Architecture
//!
//! - `config` - Settings, environment credentials, and prompt templates
//! - `groq` - Shared chat-completion client and error classification
//! - `mcp` - MCP client session over a child-process tool server
//! - `agent` - Tool-augmented topic processor
//! - `limiter` - Fixed-interval rate window
//! - `retry` - Overload-only backoff retry
//! - `analyzer` - Batch and fallback drivers, path selection
//!
//! # Example
//!
//! ```rust,no_run
//! use redpulse::analyzer::analyze_topics;
//! use redpulse::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let topics = vec!["rust".to_string(), "homelab".to_string()];
//!
//!     let report = analyze_topics(&settings, &topics).await?;
//!     println!("{}", serde_json::to_string_pretty(&report.results)?);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod groq;
pub mod limiter;
pub mod mcp;
pub mod retry;

pub use analyzer::{analyze_topics, AnalysisPath, AnalysisReport, ResultSet, TopicAnalyzer};
pub use error::{RedpulseError, Result};
