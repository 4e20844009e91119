//! MCP (Model Context Protocol) client for ocichat.
//!
//! A tool server is reached either over stdio (a spawned local script) or
//! over streamable HTTP (a network endpoint); both speak JSON-RPC 2.0. The
//! locator string decides the transport, one connection is held for the
//! whole session, and it is closed exactly once at shutdown.

pub mod client;
pub mod error;
pub mod jsonrpc;
pub mod locator;
mod transport;

pub use client::{McpClient, ToolContent, ToolEntry, ToolResult};
pub use error::McpError;
pub use locator::ServerLocator;
pub use transport::Transport;
