//! Conversation turn engine and tool dispatcher.
//!
//! One turn: build the chat request from the query and the session catalog,
//! send it, then run every tool call the model requested, strictly in the
//! order the model returned them. The transcript collects the model text,
//! the per-call announcement lines, and each tool's textual result.

use crate::error::CoreError;
use ocichat_mcp::McpClient;
use ocichat_types::{
    ChatDetails, ChatSettings, ConversationMessage, InferenceProvider, ToolCatalog,
};

/// Run one user turn and return its transcript.
///
/// The user message and each tool result are appended to `history`. The
/// history is never re-sent to the model: each turn is a stateless
/// single-shot exchange.
pub async fn run_turn(
    query: &str,
    model: &dyn InferenceProvider,
    mcp: &McpClient,
    settings: &ChatSettings,
    catalog: &ToolCatalog,
    history: &mut Vec<ConversationMessage>,
) -> Result<String, CoreError> {
    let request = ChatDetails::single_turn(settings, query, catalog);
    history.push(ConversationMessage::user(query));

    let response = model.chat(&request).await?;
    tracing::debug!(
        finish_reason = response.finish_reason.as_deref().unwrap_or(""),
        tool_calls = response.requested_tool_calls().len(),
        "chat response received"
    );

    // The model text always opens the transcript, even when empty.
    let mut transcript = vec![response.text.clone()];

    for call in response.requested_tool_calls() {
        let args = serde_json::Value::Object(call.parameters.clone());
        transcript.push(call_banner(&call.name, &args));

        let text = dispatch_tool(mcp, &call.name, args).await?;

        transcript.push("[Calling tool done]".to_string());
        transcript.push(text.clone());
        history.push(ConversationMessage::tool_result(text));
    }

    Ok(transcript.join("\n"))
}

/// Invoke one tool on the server and extract its textual payload.
///
/// Transport faults propagate; a result without a textual content block is
/// an error rather than an out-of-bounds read.
async fn dispatch_tool(
    mcp: &McpClient,
    name: &str,
    args: serde_json::Value,
) -> Result<String, CoreError> {
    let result = mcp
        .call_tool(name, args)
        .await
        .map_err(|source| CoreError::ToolExecution {
            tool: name.to_string(),
            source,
        })?;

    match result.first_text() {
        Some(text) => Ok(text.to_string()),
        None => Err(CoreError::EmptyToolResult {
            tool: name.to_string(),
        }),
    }
}

/// The announcement line printed before a tool is dispatched.
fn call_banner(name: &str, args: &serde_json::Value) -> String {
    let args_json = serde_json::to_string(args).unwrap_or_else(|_| "{}".to_string());
    format!("[Calling tool {name} with args {args_json}]")
}
