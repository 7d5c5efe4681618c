//! Bridges MCP server tools into the chat-completion tool interface.

use crate::error::{RedpulseError, Result};
use crate::mcp::ToolSession;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionTool, ChatCompletionToolArgs,
    ChatCompletionToolType, FunctionObjectArgs,
};
use std::sync::Arc;
use tracing::info;

/// Tool execution context backed by a live MCP session.
pub struct ToolBridge {
    session: Arc<ToolSession>,
    definitions: Vec<ChatCompletionTool>,
}

impl ToolBridge {
    /// Build chat-completion tool definitions from the session's inventory.
    pub fn new(session: Arc<ToolSession>) -> Result<Self> {
        let definitions = session
            .tools()
            .iter()
            .map(|tool| {
                let mut function = FunctionObjectArgs::default();
                function
                    .name(tool.name.to_string())
                    .parameters(serde_json::Value::Object(tool.input_schema.as_ref().clone()));
                if let Some(description) = &tool.description {
                    function.description(description.to_string());
                }

                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(
                        function
                            .build()
                            .map_err(|e| RedpulseError::Agent(e.to_string()))?,
                    )
                    .build()
                    .map_err(|e| RedpulseError::Agent(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            session,
            definitions,
        })
    }

    /// Tool definitions to attach to chat-completion requests.
    pub fn definitions(&self) -> &[ChatCompletionTool] {
        &self.definitions
    }

    /// Execute a single tool call requested by the model.
    ///
    /// Failures become tool-result text rather than loop aborts, so the model
    /// gets a chance to recover or move on.
    pub async fn execute(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_arguments(arguments) {
            Ok(args) => match self.session.call_tool(name, args).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool arguments: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Parse the model-supplied JSON argument string into an MCP argument map.
fn parse_arguments(raw: &str) -> Result<Option<serde_json::Map<String, serde_json::Value>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::Null => Ok(None),
        other => Err(RedpulseError::Agent(format!(
            "tool arguments must be a JSON object, got: {}",
            other
        ))),
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments_object() {
        let args = parse_arguments(r#"{"query": "rust", "limit": 2}"#).unwrap();
        let map = args.unwrap();
        assert_eq!(map.get("query").unwrap(), "rust");
        assert_eq!(map.get("limit").unwrap(), 2);
    }

    #[test]
    fn test_parse_arguments_empty_is_none() {
        assert!(parse_arguments("").unwrap().is_none());
        assert!(parse_arguments("  ").unwrap().is_none());
        assert!(parse_arguments("null").unwrap().is_none());
    }

    #[test]
    fn test_parse_arguments_rejects_non_object() {
        assert!(parse_arguments("[1, 2]").is_err());
        assert!(parse_arguments("not json").is_err());
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "search_engine".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "Found results".to_string(),
        };
        assert_eq!(format!("{}", record), r#"search_engine({"query": "test"})"#);
    }
}
