//! Providers module - reasoning collaborators (Gemini, Anthropic)
//!
//! This module defines the `LlmProvider` trait and common types for
//! interacting with reasoning providers, plus concrete adapters. The
//! provider is swapped by configuration: `for_config` selects the adapter
//! at construction time, and everything downstream sees only the trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use spendsage::providers::{GenerateOptions, LlmProvider};
//! use spendsage::providers::gemini::GeminiProvider;
//! use spendsage::memory::Message;
//!
//! async fn example() {
//!     let provider = GeminiProvider::new("your-api-key");
//!     let messages = vec![Message::user("Hello!")];
//!     let response = provider
//!         .generate(messages, vec![], None, GenerateOptions::new())
//!         .await
//!         .unwrap();
//!     println!("{}", response.content);
//! }
//! ```

pub mod claude;
pub mod gemini;
mod types;

use std::sync::Arc;

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use types::{
    FinishReason, GenerateOptions, LlmProvider, LlmResponse, LlmToolCall, ToolDefinition, Usage,
};

use crate::config::Config;
use crate::error::{ProviderError, Result, SpendError};

/// Parse an HTTP status code and response body into a structured
/// [`ProviderError`].
///
/// Centralizes the mapping from status codes to error classifications so
/// both adapters produce consistent typed errors.
pub fn parse_provider_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Auth(body.to_string()),
        402 => ProviderError::Billing(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        429 => ProviderError::RateLimit(body.to_string()),
        400 => ProviderError::InvalidRequest(body.to_string()),
        500..=599 => ProviderError::ServerError(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
    }
}

/// Build the provider named by the configuration.
///
/// Selection happens once at construction time; the agent only ever sees
/// `Arc<dyn LlmProvider>`.
pub fn for_config(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    match config.agent.provider.as_str() {
        "gemini" => {
            let key = config
                .providers
                .gemini
                .as_ref()
                .and_then(|p| p.api_key.clone())
                .ok_or_else(|| SpendError::Config("gemini API key not configured".into()))?;
            Ok(Arc::new(GeminiProvider::new(&key)))
        }
        "anthropic" | "claude" => {
            let key = config
                .providers
                .anthropic
                .as_ref()
                .and_then(|p| p.api_key.clone())
                .ok_or_else(|| SpendError::Config("anthropic API key not configured".into()))?;
            Ok(Arc::new(ClaudeProvider::new(&key)))
        }
        other => Err(SpendError::Config(format!("unknown provider: {}", other))),
    }
}
