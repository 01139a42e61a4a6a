//! Provider types for SpendSage
//!
//! This module defines the core types and trait for reasoning providers:
//! the `LlmProvider` trait, generation options, and response types. The
//! agent loop treats the provider as an opaque request/response boundary —
//! exactly one of `content` or `tool_calls` is meaningful per finish reason.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::memory::Message;

/// Declaration of a tool exposed to the reasoning provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The name of the tool (must be unique)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema describing the tool's input shape
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    ///
    /// # Example
    /// ```
    /// use spendsage::providers::ToolDefinition;
    /// use serde_json::json;
    ///
    /// let tool = ToolDefinition::new(
    ///     "calculate_statistics",
    ///     "Calculate a single metric over filtered expenses",
    ///     json!({"type": "object", "properties": {}}),
    /// );
    /// assert_eq!(tool.name, "calculate_statistics");
    /// ```
    pub fn new(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// The response carries a final natural-language answer
    Stop,
    /// The response requests one or more tool invocations
    ToolCalls,
}

/// Trait for reasoning providers (Gemini, Anthropic, stubs in tests).
///
/// Implement this trait to add support for a new provider. The adapter is
/// responsible for translating between SpendSage's message format and the
/// provider's wire format.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the conversation plus tool declarations and get one response.
    ///
    /// # Arguments
    /// * `messages` - The conversation history, oldest first
    /// * `tools` - Tools the provider may request
    /// * `model` - Optional model override (uses the default if None)
    /// * `options` - Sampling options (max tokens, temperature, ...)
    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: GenerateOptions,
    ) -> Result<LlmResponse>;

    /// The default model for this provider.
    fn default_model(&self) -> &str;

    /// The provider name (e.g. "gemini", "anthropic").
    fn name(&self) -> &str;
}

/// Options for generation requests. Use the builder pattern.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: Option<f32>,
    /// Nucleus sampling parameter
    pub top_p: Option<f32>,
}

impl GenerateOptions {
    /// Create new default options.
    ///
    /// # Example
    /// ```
    /// use spendsage::providers::GenerateOptions;
    ///
    /// let options = GenerateOptions::new().with_max_tokens(2048).with_temperature(0.3);
    /// assert_eq!(options.max_tokens, Some(2048));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the top_p (nucleus sampling) parameter.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Response from a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Text content of the response (the final answer when `finish_reason`
    /// is `Stop`)
    pub content: String,
    /// Tool calls requested by the provider (when `finish_reason` is
    /// `ToolCalls`)
    pub tool_calls: Vec<LlmToolCall>,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Token usage information, when the provider reports it
    pub usage: Option<Usage>,
}

impl LlmResponse {
    /// A final text response with no tool calls.
    ///
    /// # Example
    /// ```
    /// use spendsage::providers::{FinishReason, LlmResponse};
    ///
    /// let response = LlmResponse::text("You spent $233.73 on groceries.");
    /// assert_eq!(response.finish_reason, FinishReason::Stop);
    /// assert!(!response.has_tool_calls());
    /// ```
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_string(),
            tool_calls: vec![],
            finish_reason: FinishReason::Stop,
            usage: None,
        }
    }

    /// A response requesting tool invocations.
    pub fn with_tools(content: &str, tool_calls: Vec<LlmToolCall>) -> Self {
        Self {
            content: content.to_string(),
            tool_calls,
            finish_reason: FinishReason::ToolCalls,
            usage: None,
        }
    }

    /// Whether this response contains any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Attach usage information.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A tool call requested by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmToolCall {
    /// Correlation identifier for this call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// JSON-encoded arguments for the tool
    pub arguments: String,
}

impl LlmToolCall {
    /// Create a new tool call.
    pub fn new(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

/// Token usage information from one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used (prompt + completion)
    pub total_tokens: u32,
}

impl Usage {
    /// Create new usage information.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}
