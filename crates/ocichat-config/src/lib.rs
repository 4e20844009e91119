//! Configuration resolution for ocichat.
//!
//! Sources, in precedence order: CLI flags > environment variables > TOML
//! config file > defaults. Terraform-style `TF_VAR_*` names are honored
//! alongside the `OCICHAT_*` names.

use ocichat_types::{ChatSettings, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default max tokens for a chat response.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default sampling temperature (deterministic).
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Default per-request timeout for the tool-server transport.
pub const DEFAULT_MCP_TIMEOUT_MS: u64 = 30000;

/// Resolved configuration for one ocichat session.
#[derive(Debug, Clone)]
pub struct OcichatConfig {
    pub region: String,
    pub compartment_id: String,
    pub model_id: String,
    /// Full endpoint override; when absent the regional endpoint is built
    /// from `region`.
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub mcp_timeout_ms: u64,
}

/// Settings that can be read from the TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub mcp: McpSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    pub region: Option<String>,
    pub compartment_id: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpSettings {
    pub timeout_ms: Option<u64>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub region: Option<String>,
    pub compartment_id: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

impl OcichatConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Region, compartment, and model are required; a missing one is a
    /// configuration error surfaced before any connection is attempted.
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let settings = load_settings_file(&config_dir().join("config.toml"));

        let region = overrides
            .region
            .or_else(|| env_var("TF_VAR_region"))
            .or_else(|| env_var("OCICHAT_REGION"))
            .or(settings.api.region)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "region (set TF_VAR_region or add to ~/.ocichat/config.toml)".into(),
            })?;

        let compartment_id = overrides
            .compartment_id
            .or_else(|| env_var("TF_VAR_compartment_ocid"))
            .or_else(|| env_var("OCICHAT_COMPARTMENT"))
            .or(settings.api.compartment_id)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "compartment_id (set TF_VAR_compartment_ocid or add to \
                      ~/.ocichat/config.toml)"
                    .into(),
            })?;

        let model_id = overrides
            .model
            .or_else(|| env_var("TF_VAR_genai_cohere_model"))
            .or_else(|| env_var("OCICHAT_MODEL"))
            .or(settings.api.model)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "model (set TF_VAR_genai_cohere_model or add to ~/.ocichat/config.toml)"
                    .into(),
            })?;

        let endpoint = env_var("OCICHAT_ENDPOINT").or(settings.api.endpoint);
        let auth_token = env_var("OCICHAT_AUTH_TOKEN").or(settings.api.auth_token);

        let max_tokens = overrides
            .max_tokens
            .or(settings.api.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = settings.api.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        let mcp_timeout_ms = settings.mcp.timeout_ms.unwrap_or(DEFAULT_MCP_TIMEOUT_MS);

        Ok(OcichatConfig {
            region,
            compartment_id,
            model_id,
            endpoint,
            auth_token,
            max_tokens,
            temperature,
            mcp_timeout_ms,
        })
    }

    /// The per-session chat parameters handed to the turn engine.
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            compartment_id: self.compartment_id.clone(),
            model_id: self.model_id.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// The ocichat config directory (~/.ocichat/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("OCICHAT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ocichat")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load and parse the TOML settings file, degrading to defaults on any error.
fn load_settings_file(path: &std::path::Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
