//! Tool-augmented topic processor with a tool calling loop.

use super::tools::{ToolBridge, ToolCallRecord};
use crate::analyzer::TopicAnalyzer;
use crate::config::{cutoff_date, Prompts, Settings};
use crate::error::{RedpulseError, Result};
use crate::groq::{classify_api_error, GroqClient};
use crate::limiter::RateWindow;
use crate::mcp::ToolSession;
use crate::retry::{retry_overloaded, RetryConfig};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Agent that analyzes one Reddit topic at a time using MCP-backed tools.
pub struct RedditAgent {
    client: GroqClient,
    model: String,
    temperature: f32,
    bridge: ToolBridge,
    prompts: Prompts,
    limiter: Arc<RateWindow>,
    retry: RetryConfig,
    lookback_days: u32,
    max_iterations: usize,
}

impl RedditAgent {
    /// Create an agent bound to a live tool session.
    pub fn new(
        client: GroqClient,
        session: Arc<ToolSession>,
        prompts: Prompts,
        settings: &Settings,
    ) -> Result<Self> {
        let bridge = ToolBridge::new(session)?;

        Ok(Self {
            client,
            model: settings.analysis.model.clone(),
            temperature: settings.analysis.temperature,
            bridge,
            prompts,
            limiter: Arc::new(RateWindow::new(settings.pacing.tool_window())),
            retry: RetryConfig::from(&settings.retry),
            lookback_days: settings.analysis.lookback_days,
            max_iterations: settings.analysis.max_iterations,
        })
    }

    /// Run the tool calling loop for a single topic.
    #[instrument(skip(self), fields(topic = %topic))]
    async fn run_loop(&self, topic: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        vars.insert(
            "cutoff_date".to_string(),
            cutoff_date(self.lookback_days),
        );

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Prompts::render(&self.prompts.agent.system, &vars))
                .build()
                .map_err(|e| RedpulseError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Prompts::render(&self.prompts.agent.user, &vars))
                .build()
                .map_err(|e| RedpulseError::Agent(e.to_string()))?
                .into(),
        ];

        let mut iterations = 0;
        let mut tool_calls_made: Vec<ToolCallRecord> = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(RedpulseError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .temperature(self.temperature)
                .messages(messages.clone())
                .tools(self.bridge.definitions().to_vec())
                .build()
                .map_err(|e| RedpulseError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(classify_api_error)?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| RedpulseError::Agent("No response from model".to_string()))?;

            match &choice.message.tool_calls {
                Some(tool_calls) if !tool_calls.is_empty() => {
                    // Thread the assistant turn and each tool result back in.
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| RedpulseError::Agent(e.to_string()))?;
                    messages.push(assistant_msg.into());

                    for tool_call in tool_calls {
                        let record = self.bridge.execute(tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(record.result.clone())
                            .build()
                            .map_err(|e| RedpulseError::Agent(e.to_string()))?;
                        messages.push(tool_msg.into());

                        tool_calls_made.push(record);
                    }
                }
                _ => {
                    debug!(
                        "Agent finished after {} iterations, {} tool calls",
                        iterations,
                        tool_calls_made.len()
                    );
                    return Ok(choice.message.content.clone().unwrap_or_default());
                }
            }
        }
    }
}

#[async_trait]
impl TopicAnalyzer for RedditAgent {
    /// Analyze one topic: take a rate-window slot, then run the loop under
    /// the overload retry policy.
    async fn analyze(&self, topic: &str) -> Result<String> {
        self.limiter.acquire().await;
        retry_overloaded(&self.retry, "process_topic", || self.run_loop(topic)).await
    }
}
