//! Configuration management for SpendSage
//!
//! Configuration is loaded from `~/.spendsage/config.json` with environment
//! variable overrides following the pattern `SPENDSAGE_SECTION_KEY`.

mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use crate::error::Result;

impl Config {
    /// Returns the SpendSage configuration directory path (~/.spendsage)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".spendsage")
    }

    /// Returns the path to the config file (~/.spendsage/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        // Agent defaults
        if let Ok(val) = std::env::var("SPENDSAGE_AGENT_PROVIDER") {
            self.agent.provider = val;
        }
        if let Ok(val) = std::env::var("SPENDSAGE_AGENT_MODEL") {
            self.agent.model = Some(val);
        }
        if let Ok(val) = std::env::var("SPENDSAGE_AGENT_MAX_STEPS") {
            if let Ok(v) = val.parse() {
                self.agent.max_steps = v;
            }
        }
        if let Ok(val) = std::env::var("SPENDSAGE_AGENT_STEP_PAUSE_MS") {
            if let Ok(v) = val.parse() {
                self.agent.step_pause_ms = v;
            }
        }
        if let Ok(val) = std::env::var("SPENDSAGE_AGENT_MAX_TOKENS") {
            if let Ok(v) = val.parse() {
                self.agent.max_tokens = v;
            }
        }
        if let Ok(val) = std::env::var("SPENDSAGE_AGENT_TEMPERATURE") {
            if let Ok(v) = val.parse() {
                self.agent.temperature = v;
            }
        }

        // Provider API keys. GEMINI_API_KEY / ANTHROPIC_API_KEY are honored
        // as the conventional names alongside the SPENDSAGE_ prefix.
        if let Ok(val) = std::env::var("SPENDSAGE_PROVIDERS_GEMINI_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
        {
            self.providers
                .gemini
                .get_or_insert_with(ProviderConfig::default)
                .api_key = Some(val);
        }
        if let Ok(val) = std::env::var("SPENDSAGE_PROVIDERS_ANTHROPIC_API_KEY")
            .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
        {
            self.providers
                .anthropic
                .get_or_insert_with(ProviderConfig::default)
                .api_key = Some(val);
        }

        // Logging
        if let Ok(val) = std::env::var("SPENDSAGE_LOGGING_LEVEL") {
            self.logging.level = val;
        }
    }
}
