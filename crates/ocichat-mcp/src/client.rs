//! MCP client — one tool-server connection.
//!
//! Handles the protocol handshake (initialize + initialized notification),
//! tool listing (tools/list), and tool invocation (tools/call). The client
//! owns the transport for the session and closes it exactly once.

use crate::error::McpError;
use crate::locator::ServerLocator;
use crate::transport::Transport;
use serde::Deserialize;

/// MCP protocol version we speak.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// A tool as declared by the server: name, description, raw JSON schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Structured result of one tools/call round trip.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    /// The first textual content block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// One content block within a tool result.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: serde_json::Value,
    },
}

#[derive(Deserialize)]
struct ToolsListPayload {
    tools: Vec<ToolEntry>,
}

/// Client for a single tool server.
pub struct McpClient {
    transport: Transport,
    server: String,
}

impl McpClient {
    /// Connect to the server named by the locator and run the handshake.
    ///
    /// On a handshake failure the transport is torn down here, so the caller
    /// never holds a half-open connection.
    pub async fn connect(locator: &ServerLocator, timeout_ms: u64) -> Result<Self, McpError> {
        let transport = Transport::connect(locator, timeout_ms)?;

        let init_params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "ocichat",
                "version": env!("CARGO_PKG_VERSION"),
            }
        });

        let handshake = async {
            transport
                .request("initialize", Some(init_params))
                .await?
                .into_result()?;
            transport.notify("notifications/initialized", None).await
        };

        if let Err(e) = handshake.await {
            transport.shutdown().await;
            return Err(e);
        }

        tracing::info!("Connected to tool server {}", locator.display());

        Ok(Self {
            transport,
            server: locator.display(),
        })
    }

    /// Ask the server for its tool list.
    pub async fn list_tools(&self) -> Result<Vec<ToolEntry>, McpError> {
        let payload = self
            .transport
            .request("tools/list", None)
            .await?
            .into_result()?;
        let list: ToolsListPayload = serde_json::from_value(payload)
            .map_err(|e| McpError::Protocol(format!("unexpected tools/list payload: {e}")))?;
        Ok(list.tools)
    }

    /// Invoke one tool with the given argument mapping.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, McpError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments,
        });
        let payload = self
            .transport
            .request("tools/call", Some(params))
            .await?
            .into_result()?;
        serde_json::from_value(payload)
            .map_err(|e| McpError::Protocol(format!("unexpected tools/call payload: {e}")))
    }

    /// The server this client is connected to, for logs.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Close the connection. Consumes the client, so teardown runs once.
    pub async fn shutdown(self) {
        self.transport.shutdown().await;
    }
}
