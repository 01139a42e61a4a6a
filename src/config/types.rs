//! Configuration type definitions for SpendSage
//!
//! All fields carry serde defaults so a partial config file (or none at all)
//! resolves to a fully usable configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent loop defaults
    pub agent: AgentDefaults,
    /// Provider credentials and endpoints
    pub providers: ProvidersConfig,
    /// Logging output configuration
    pub logging: LoggingConfig,
}

/// Defaults for the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    /// Which provider to construct ("gemini" or "anthropic")
    pub provider: String,
    /// Model override; None uses the provider's default model
    pub model: Option<String>,
    /// Maximum provider round-trips per query
    pub max_steps: usize,
    /// Pause between tool rounds, in milliseconds
    pub step_pause_ms: u64,
    /// Max tokens per generation request
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            max_steps: 3,
            step_pause_ms: 500,
            max_tokens: 2048,
            temperature: 0.3,
        }
    }
}

/// Per-provider credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key; usually supplied via environment variable
    pub api_key: Option<String>,
    /// Alternative API base URL (proxies, test servers)
    pub api_base: Option<String>,
}

/// All configured providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable text
    Text,
    /// Structured JSON lines for log aggregators
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default level filter when `RUST_LOG` is unset
    pub level: String,
    /// Optional log file path; None logs to stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
            file: None,
        }
    }
}
