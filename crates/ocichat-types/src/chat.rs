//! Request and response shapes for the Generative AI chat action.

use crate::tool::ToolCatalog;
use serde::{Deserialize, Serialize};

/// The API dialect tag sent with every request.
pub const API_FORMAT_COHERE: &str = "COHERE";

/// Per-session chat parameters, resolved once at startup and passed
/// explicitly into the turn engine (no process-wide serving descriptor).
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub compartment_id: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// How the target model is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingType {
    OnDemand,
    Dedicated,
}

/// Model-selection descriptor sent with every chat request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingMode {
    pub serving_type: ServingType,
    pub model_id: String,
}

/// Top-level chat request body: tenancy compartment, serving mode, and the
/// dialect-specific request payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetails {
    pub compartment_id: String,
    pub serving_mode: ServingMode,
    pub chat_request: CohereChatRequest,
}

impl ChatDetails {
    /// Build a single-turn request from session settings, a user query, and
    /// the tool catalog.
    pub fn single_turn(settings: &ChatSettings, query: &str, tools: &ToolCatalog) -> Self {
        Self {
            compartment_id: settings.compartment_id.clone(),
            serving_mode: ServingMode {
                serving_type: ServingType::OnDemand,
                model_id: settings.model_id.clone(),
            },
            chat_request: CohereChatRequest {
                api_format: API_FORMAT_COHERE,
                message: query.to_string(),
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
                tools: if tools.is_empty() {
                    None
                } else {
                    Some(tools.clone())
                },
            },
        }
    }
}

/// Cohere-dialect chat request payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohereChatRequest {
    pub api_format: &'static str,
    pub message: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCatalog>,
}

/// Envelope around the chat response returned by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResult {
    #[serde(default)]
    pub model_id: Option<String>,
    pub chat_response: CohereChatResponse,
}

/// The model's reply for one turn.
///
/// `tool_calls` is an explicit optional field rather than a runtime
/// attribute probe: `None` and `Some(vec![])` both mean "no tools requested".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohereChatResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl CohereChatResponse {
    /// Tool calls requested by the model, in the order it returned them.
    pub fn requested_tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

/// One tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}
