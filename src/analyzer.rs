//! Batch analysis drivers.
//!
//! Runs the topic list sequentially through a `TopicAnalyzer`, isolating
//! per-topic failures, and selects between the tool-augmented agent and the
//! degraded fallback path. The fallback switch is explicit and observable:
//! it is logged and reported in the returned `AnalysisPath`.

use crate::agent::RedditAgent;
use crate::config::{Credentials, Prompts, Settings};
use crate::error::Result;
use crate::groq::{classify_api_error, GroqClient};
use crate::mcp::ToolSession;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// A single-topic analysis strategy.
///
/// Implemented by the tool-augmented agent and the fallback path; tests
/// substitute fakes at this seam.
#[async_trait]
pub trait TopicAnalyzer: Send + Sync {
    /// Produce analysis text for one topic.
    async fn analyze(&self, topic: &str) -> Result<String>;
}

/// Final result mapping, serialized as `{"reddit_analysis": {topic: text}}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResultSet {
    pub reddit_analysis: BTreeMap<String, String>,
}

/// Which execution path produced the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisPath {
    /// Tool-augmented agent with live Reddit data.
    Agent,
    /// Degraded direct-model path, no live data.
    Fallback { reason: String },
}

/// Results plus the path that produced them.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub results: ResultSet,
    pub path: AnalysisPath,
}

/// Analyze every topic and return the result set.
///
/// The only error this returns is the fatal configuration error from missing
/// credentials; everything downstream degrades into placeholder text or the
/// fallback path, so the result mapping always covers the full topic list.
pub async fn analyze_topics(settings: &Settings, topics: &[String]) -> Result<AnalysisReport> {
    let credentials = Credentials::from_env()?;
    analyze_topics_with(settings, &credentials, topics).await
}

/// Analyze with explicit credentials (no environment access).
pub async fn analyze_topics_with(
    settings: &Settings,
    credentials: &Credentials,
    topics: &[String],
) -> Result<AnalysisReport> {
    let client = crate::groq::create_client(credentials, &settings.analysis);
    let prompts = Prompts::default();

    let fallback: Arc<dyn TopicAnalyzer> = Arc::new(FallbackAnalyzer::new(
        client.clone(),
        prompts.clone(),
        settings,
    ));

    let (primary, session) = match ToolSession::connect(&settings.mcp, credentials).await {
        Ok(session) => {
            let session = Arc::new(session);
            match RedditAgent::new(client, Arc::clone(&session), prompts, settings) {
                Ok(agent) => (
                    Ok(Arc::new(agent) as Arc<dyn TopicAnalyzer>),
                    Some(session),
                ),
                Err(e) => (Err(e), Some(session)),
            }
        }
        Err(e) => (Err(e), None),
    };

    let report = run_pipeline(
        primary,
        fallback,
        topics,
        settings.pacing.agent_pause(),
        settings.pacing.fallback_pause(),
    )
    .await;

    if let Some(session) = session {
        session.shutdown().await;
    }

    Ok(report)
}

/// Select the execution path and run the batch over it.
pub(crate) async fn run_pipeline(
    primary: Result<Arc<dyn TopicAnalyzer>>,
    fallback: Arc<dyn TopicAnalyzer>,
    topics: &[String],
    primary_pause: Duration,
    fallback_pause: Duration,
) -> AnalysisReport {
    match primary {
        Ok(analyzer) => {
            info!("analyzing {} topics with live Reddit tools", topics.len());
            AnalysisReport {
                results: run_batch(analyzer.as_ref(), topics, primary_pause).await,
                path: AnalysisPath::Agent,
            }
        }
        Err(e) => {
            warn!(
                "tool-augmented path unavailable ({}), using fallback analysis",
                e
            );
            AnalysisReport {
                results: run_batch(fallback.as_ref(), topics, fallback_pause).await,
                path: AnalysisPath::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}

/// Process topics strictly sequentially with per-topic failure isolation.
///
/// A failed topic stores a descriptive placeholder and never aborts the
/// batch. The pause applies after every topic regardless of outcome.
pub async fn run_batch(
    analyzer: &dyn TopicAnalyzer,
    topics: &[String],
    pause: Duration,
) -> ResultSet {
    let mut reddit_analysis = BTreeMap::new();

    for topic in topics {
        match analyzer.analyze(topic).await {
            Ok(text) => {
                info!("completed analysis for topic '{}'", topic);
                reddit_analysis.insert(topic.clone(), text);
            }
            Err(e) => {
                error!("Error processing topic {}: {}", topic, e);
                reddit_analysis.insert(topic.clone(), format!("Error analyzing {}: {}", topic, e));
            }
        }
        tokio::time::sleep(pause).await;
    }

    ResultSet { reddit_analysis }
}

/// Degraded analyzer: direct model call, no tools, no retry, no limiter.
///
/// The prompt tells the model it has no live data access and asks for a
/// representative analysis instead.
pub struct FallbackAnalyzer {
    client: GroqClient,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl FallbackAnalyzer {
    pub fn new(client: GroqClient, prompts: Prompts, settings: &Settings) -> Self {
        Self {
            client,
            model: settings.analysis.model.clone(),
            temperature: settings.analysis.temperature,
            prompts,
        }
    }
}

#[async_trait]
impl TopicAnalyzer for FallbackAnalyzer {
    #[instrument(skip(self), fields(topic = %topic))]
    async fn analyze(&self, topic: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        let prompt = Prompts::render(&self.prompts.fallback.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| crate::error::RedpulseError::Agent(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(messages)
            .build()
            .map_err(|e| crate::error::RedpulseError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_api_error)?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| {
                crate::error::RedpulseError::Groq("Empty response from model".to_string())
            })?
            .clone();

        Ok(answer)
    }
}
