//! Claude (Anthropic) reasoning provider implementation
//!
//! Implements the `LlmProvider` trait for the Anthropic messages API,
//! handling content-block conversion (`tool_use` / `tool_result`), tool
//! declarations, and typed error mapping.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, SpendError};
use crate::memory::{Message, Role};

use super::{
    parse_provider_error, FinishReason, GenerateOptions, LlmProvider, LlmResponse, LlmToolCall,
    ToolDefinition, Usage,
};

/// The Claude API endpoint URL.
const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// The default Claude model to use.
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// The Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude/Anthropic reasoning provider.
pub struct ClaudeProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for making requests
    client: Client,
}

impl ClaudeProvider {
    /// Create a new Claude provider with the given API key.
    ///
    /// # Example
    /// ```
    /// use spendsage::providers::{ClaudeProvider, LlmProvider};
    ///
    /// let provider = ClaudeProvider::new("sk-ant-api03-xxx");
    /// assert_eq!(provider.name(), "claude");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Create a provider with a custom HTTP client.
    pub fn with_client(api_key: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            client,
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: GenerateOptions,
    ) -> Result<LlmResponse> {
        let model = model.unwrap_or(DEFAULT_MODEL);
        let (system, claude_messages) = convert_messages(messages);

        let request = ClaudeRequest {
            model: model.to_string(),
            max_tokens: options.max_tokens.unwrap_or(2048),
            messages: claude_messages,
            system,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.into_iter().map(convert_tool).collect())
            },
            temperature: options.temperature,
            top_p: options.top_p,
        };

        let response = self
            .client
            .post(CLAUDE_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();

            let body = if let Ok(error_response) =
                serde_json::from_str::<ClaudeErrorResponse>(&error_text)
            {
                format!(
                    "Claude API error: {} - {}",
                    error_response.error.r#type, error_response.error.message
                )
            } else {
                format!("Claude API error: {}", error_text)
            };

            return Err(SpendError::from(parse_provider_error(status, &body)));
        }

        let claude_response: ClaudeResponse = response.json().await?;
        Ok(convert_response(claude_response))
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn name(&self) -> &str {
        "claude"
    }
}

/// Convert conversation messages to Claude format, extracting the system
/// prompt. Tool results travel back as `tool_result` blocks in user
/// messages, per the messages API contract.
fn convert_messages(messages: Vec<Message>) -> (Option<String>, Vec<ClaudeMessage>) {
    let mut system: Option<String> = None;
    let mut converted: Vec<ClaudeMessage> = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                system = Some(match system.take() {
                    Some(existing) => format!("{}\n\n{}", existing, message.content),
                    None => message.content,
                });
            }
            Role::User => converted.push(ClaudeMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text {
                    text: message.content,
                }],
            }),
            Role::Assistant => {
                let mut content = Vec::new();
                if !message.content.is_empty() {
                    content.push(ContentBlock::Text {
                        text: message.content,
                    });
                }
                for call in message.tool_calls.unwrap_or_default() {
                    let input: Value =
                        serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({}));
                    content.push(ContentBlock::ToolUse {
                        id: call.id,
                        name: call.name,
                        input,
                    });
                }
                if !content.is_empty() {
                    converted.push(ClaudeMessage {
                        role: "assistant".to_string(),
                        content,
                    });
                }
            }
            Role::Tool => converted.push(ClaudeMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::ToolResult {
                    tool_use_id: message.tool_call_id.unwrap_or_default(),
                    content: message.content,
                }],
            }),
        }
    }

    (system, converted)
}

fn convert_tool(tool: ToolDefinition) -> ClaudeTool {
    ClaudeTool {
        name: tool.name,
        description: tool.description,
        input_schema: tool.parameters,
    }
}

fn convert_response(response: ClaudeResponse) -> LlmResponse {
    let mut text_parts: Vec<String> = Vec::new();
    let mut tool_calls: Vec<LlmToolCall> = Vec::new();

    for block in response.content {
        match block {
            ContentBlock::Text { text } => text_parts.push(text),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(LlmToolCall {
                    id,
                    name,
                    arguments: input.to_string(),
                });
            }
            ContentBlock::ToolResult { .. } => {}
        }
    }

    let finish_reason = if response.stop_reason.as_deref() == Some("tool_use")
        || !tool_calls.is_empty()
    {
        FinishReason::ToolCalls
    } else {
        FinishReason::Stop
    };

    let usage = response
        .usage
        .map(|u| Usage::new(u.input_tokens, u.output_tokens));

    LlmResponse {
        content: text_parts.join(""),
        tool_calls,
        finish_reason,
        usage,
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ClaudeTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClaudeMessage {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct ClaudeTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
    r#type: String,
    message: String,
}
