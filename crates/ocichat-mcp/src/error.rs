//! Error types for MCP operations.

use thiserror::Error;

/// Errors from tool-server communication.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Server locator must be an http(s) URL or a .py/.js script: {locator}")]
    InvalidLocator { locator: String },

    #[error("Failed to spawn tool server '{command}': {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("Failed to connect to tool server at {url}: {message}")]
    ConnectFailed { url: String, message: String },

    #[error("JSON-RPC error from tool server (code {code}): {message}")]
    JsonRpc { code: i64, message: String },

    #[error("MCP protocol error: {0}")]
    Protocol(String),

    #[error("Tool server did not answer '{method}' within {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
