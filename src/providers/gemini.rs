//! Gemini (Google) reasoning provider implementation
//!
//! Implements the `LlmProvider` trait for the Generative Language API,
//! handling message conversion, function declarations, and response parsing.
//! Gemini does not assign tool-call identifiers, so this adapter synthesizes
//! a UUID per requested call; results are correlated back by function name
//! and order, which the API expects.

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

/// The Generative Language API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The default Gemini model to use.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini reasoning provider.
pub struct GeminiProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for making requests
    client: Client,
    /// API base URL (overridable for tests)
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given API key.
    ///
    /// # Example
    /// ```
    /// use spendsage::providers::{GeminiProvider, LlmProvider};
    ///
    /// let provider = GeminiProvider::new("AIza-xxx");
    /// assert_eq!(provider.name(), "gemini");
    /// assert_eq!(provider.default_model(), "gemini-2.5-flash");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Create a provider with a custom HTTP client.
    pub fn with_client(api_key: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            client,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (local test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: GenerateOptions,
    ) -> Result<LlmResponse> {
        let model = model.unwrap_or(DEFAULT_MODEL);
        let (system_instruction, contents) = convert_messages(messages);

        let request = GeminiRequest {
            contents,
            system_instruction,
            tools: if tools.is_empty() {
                None
            } else {
                Some(vec![GeminiToolGroup {
                    function_declarations: tools.into_iter().map(convert_tool).collect(),
                }])
            },
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
            },
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SpendError::from(parse_provider_error(
                status,
                &format!("Gemini API error: {}", body),
            )));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        convert_response(gemini_response)
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Convert conversation messages to Gemini contents, extracting the system
/// instruction. System messages are concatenated; tool results become
/// `functionResponse` parts on the user side.
fn convert_messages(messages: Vec<Message>) -> (Option<SystemInstruction>, Vec<Content>) {
    let mut system_parts: Vec<String> = Vec::new();
    let mut contents: Vec<Content> = Vec::new();

    for message in messages {
        match message.role {
            Role::System => system_parts.push(message.content),
            Role::User => contents.push(Content {
                role: "user".to_string(),
                parts: vec![Part::text(&message.content)],
            }),
            Role::Assistant => {
                let mut parts = Vec::new();
                if !message.content.is_empty() {
                    parts.push(Part::text(&message.content));
                }
                for call in message.tool_calls.unwrap_or_default() {
                    let args: Value =
                        serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({}));
                    parts.push(Part {
                        function_call: Some(FunctionCall {
                            name: call.name,
                            args,
                        }),
                        ..Default::default()
                    });
                }
                if !parts.is_empty() {
                    contents.push(Content {
                        role: "model".to_string(),
                        parts,
                    });
                }
            }
            Role::Tool => {
                let parsed: Value = serde_json::from_str(&message.content)
                    .unwrap_or(Value::String(message.content.clone()));
                let response = if parsed.is_object() {
                    parsed
                } else {
                    json!({ "result": parsed })
                };
                contents.push(Content {
                    role: "user".to_string(),
                    parts: vec![Part {
                        function_response: Some(FunctionResponse {
                            name: message.tool_name.unwrap_or_default(),
                            response,
                        }),
                        ..Default::default()
                    }],
                });
            }
        }
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(SystemInstruction {
            parts: vec![Part::text(&system_parts.join("\n\n"))],
        })
    };

    (system_instruction, contents)
}

fn convert_tool(tool: ToolDefinition) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name,
        description: tool.description,
        parameters: tool.parameters,
    }
}

fn convert_response(response: GeminiResponse) -> Result<LlmResponse> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| SpendError::Provider("Gemini returned no candidates".into()))?;

    let mut text_parts: Vec<String> = Vec::new();
    let mut tool_calls: Vec<LlmToolCall> = Vec::new();

    for part in candidate.content.parts {
        if let Some(text) = part.text {
            text_parts.push(text);
        }
        if let Some(call) = part.function_call {
            tool_calls.push(LlmToolCall {
                id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                name: call.name,
                arguments: call.args.to_string(),
            });
        }
    }

    let finish_reason = if tool_calls.is_empty() {
        FinishReason::Stop
    } else {
        FinishReason::ToolCalls
    };

    let usage = response.usage_metadata.map(|u| {
        Usage::new(
            u.prompt_token_count.unwrap_or(0),
            u.candidates_token_count.unwrap_or(0),
        )
    });

    Ok(LlmResponse {
        content: text_parts.join(""),
        tool_calls,
        finish_reason,
        usage,
    })
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiToolGroup>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolGroup {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}
