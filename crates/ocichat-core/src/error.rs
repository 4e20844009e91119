//! Error types for the orchestration loop.

use ocichat_mcp::McpError;
use ocichat_types::ChatError;
use thiserror::Error;

/// Errors from catalog construction, turn processing, and tool dispatch.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Tool '{tool}' declares a malformed parameter schema: {message}")]
    MalformedToolSchema { tool: String, message: String },

    #[error("Tool '{tool}' returned no textual content")]
    EmptyToolResult { tool: String },

    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution { tool: String, source: McpError },

    #[error("Tool server error: {0}")]
    Mcp(#[from] McpError),

    #[error("Chat request failed: {0}")]
    ChatRequest(#[from] ChatError),
}
