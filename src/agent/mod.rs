//! Tool-augmented agent for live Reddit analysis.
//!
//! Binds the Groq chat model to the MCP tool session, giving the model live
//! search and scraping tools while it builds a per-topic summary.

mod runner;
mod tools;

pub use runner::RedditAgent;
pub use tools::{ToolBridge, ToolCallRecord};
