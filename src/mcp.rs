//! MCP client session for live Reddit data tools.
//!
//! Spawns the tool server as a child process and speaks MCP over its
//! stdio pipes. The Bright Data server needs `API_TOKEN` and
//! `WEB_UNLOCKER_ZONE` in its environment; when those are missing the
//! session typically fails to establish, which callers treat as the signal
//! to degrade to the fallback path.

use crate::config::{Credentials, McpSettings};
use crate::error::{RedpulseError, Result};
use rmcp::model::{CallToolRequestParam, Tool};
use rmcp::service::RunningService;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::{RoleClient, ServiceExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A live MCP session with the tool inventory captured at connect time.
pub struct ToolSession {
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
    tools: Vec<Tool>,
}

impl ToolSession {
    /// Spawn the tool server and initialize an MCP session over its stdio.
    ///
    /// Any failure here (spawn, handshake, tool listing) is a path-level
    /// failure: the caller abandons the tool-augmented path entirely.
    pub async fn connect(settings: &McpSettings, credentials: &Credentials) -> Result<Self> {
        let transport = TokioChildProcess::new(Command::new(&settings.command).configure(|cmd| {
            for arg in &settings.args {
                cmd.arg(arg);
            }
            if let Some(token) = &credentials.api_token {
                cmd.env("API_TOKEN", token);
            }
            if let Some(zone) = &credentials.web_unlocker_zone {
                cmd.env("WEB_UNLOCKER_ZONE", zone);
            }
        }))
        .map_err(|e| {
            RedpulseError::Mcp(format!("failed to spawn {}: {}", settings.command, e))
        })?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| RedpulseError::Mcp(format!("session initialization failed: {}", e)))?;

        let tools = service
            .list_all_tools()
            .await
            .map_err(|e| RedpulseError::Mcp(format!("failed to list tools: {}", e)))?;

        info!(
            "MCP session established with {} tools via {}",
            tools.len(),
            settings.command
        );

        Ok(Self {
            service: Mutex::new(Some(service)),
            tools,
        })
    }

    /// Tools advertised by the server at connect time.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Invoke a tool by name and collect its text output.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<String> {
        let guard = self.service.lock().await;
        let service = guard
            .as_ref()
            .ok_or_else(|| RedpulseError::Mcp("session is closed".to_string()))?;

        debug!("calling MCP tool {}", name);
        let result = service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
                meta: None,
                task: None,
            })
            .await
            .map_err(|e| RedpulseError::Mcp(format!("tool {} failed: {}", name, e)))?;

        let text = result
            .content
            .iter()
            .filter_map(|content| content.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error.unwrap_or(false) {
            return Err(RedpulseError::Mcp(format!(
                "tool {} reported an error: {}",
                name, text
            )));
        }

        Ok(text)
    }

    /// Tear down the session and reap the child process. Best-effort.
    pub async fn shutdown(&self) {
        if let Some(service) = self.service.lock().await.take() {
            if let Err(e) = service.cancel().await {
                debug!("MCP shutdown error: {}", e);
            }
        }
    }
}
