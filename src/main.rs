//! Redpulse CLI entry point.

use anyhow::Result;
use clap::Parser;
use redpulse::analyzer::{analyze_topics, AnalysisPath};
use redpulse::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Redpulse - Reddit Discussion Analysis
///
/// Summarizes recent Reddit discussion for each topic with a tool-augmented
/// LLM agent, falling back to an offline analysis when live data tools are
/// unavailable. Requires GROQ_API_KEY; API_TOKEN and WEB_UNLOCKER_ZONE
/// enable the live-data path.
#[derive(Parser, Debug)]
#[command(name = "redpulse")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Topics to analyze, in order
    #[arg(required = true)]
    topics: Vec<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("redpulse={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    let report = analyze_topics(&settings, &cli.topics).await?;

    if let AnalysisPath::Fallback { reason } = &report.path {
        eprintln!("note: live data tools unavailable ({}), results are representative only", reason);
    }

    println!("{}", serde_json::to_string_pretty(&report.results)?);

    Ok(())
}
