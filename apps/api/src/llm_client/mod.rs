/// LLM Client — the single point of entry for all Claude API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module, via the `ChatModel`
/// trait so handlers and pipelines can be exercised with stub models.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

/// Bounds on the website-fetch tool loop. The scrape agent may request
/// page fetches; it is not a crawler. Each fetched body is truncated.
const MAX_TOOL_ROUNDS: usize = 4;
const FETCHED_BODY_LIMIT: usize = 20 * 1024;
const FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One agent invocation: a user prompt, an agent-identity system prompt,
/// and whether the website-fetch capability is granted for this call.
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    pub system: &'a str,
    pub website_access: bool,
}

/// The seam every model call goes through. Production uses `LlmClient`;
/// tests inject deterministic stubs.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [AnthropicMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
}

#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    ToolResults(Vec<ToolResultBlock>),
}

#[derive(Debug, Clone, Serialize)]
struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct ToolResultBlock {
    #[serde(rename = "type")]
    block_type: &'static str,
    tool_use_id: String,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates all text blocks, in order, joined by newlines.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.content
            .iter()
            .filter(|b| b.block_type == "tool_use")
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by every agent in the service.
/// Wraps the Anthropic Messages API. Every call is one best-effort
/// attempt with an explicit timeout; there is no retry policy.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    fetcher: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            fetcher: Client::builder()
                .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build fetch client"),
            api_key,
        }
    }

    /// Makes one call to the Claude API, returning the full response object.
    async fn request(
        &self,
        system: &str,
        messages: &[AnthropicMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages,
            tools,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Plain single-turn completion.
    async fn complete_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let messages = vec![AnthropicMessage {
            role: "user",
            content: MessageContent::Text(prompt.to_string()),
        }];
        let response = self.request(system, &messages, None).await?;
        let text = response.text();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }

    /// Completion with the `fetch_website` tool exposed. Runs a bounded
    /// tool loop: each round the model may request page fetches, which
    /// are performed here and fed back as tool results. The returned
    /// transcript is the concatenation of all text the model produced.
    async fn complete_with_website_tool(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<String, LlmError> {
        let tools = [website_fetch_tool()];
        let mut messages = vec![AnthropicMessage {
            role: "user",
            content: MessageContent::Text(prompt.to_string()),
        }];
        let mut transcript = String::new();

        for round in 0..=MAX_TOOL_ROUNDS {
            let response = self.request(system, &messages, Some(&tools)).await?;

            let text = response.text();
            if !text.is_empty() {
                if !transcript.is_empty() {
                    transcript.push('\n');
                }
                transcript.push_str(&text);
            }

            let tool_uses = response.tool_uses();
            if tool_uses.is_empty() || response.stop_reason.as_deref() != Some("tool_use") {
                break;
            }
            if round == MAX_TOOL_ROUNDS {
                warn!("website tool loop hit round cap ({MAX_TOOL_ROUNDS}); stopping");
                break;
            }

            let mut results = Vec::with_capacity(tool_uses.len());
            for tool_use in &tool_uses {
                let url = tool_use
                    .input
                    .as_ref()
                    .and_then(|v| v.get("url"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                let content = match self.fetch_website(url).await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("website fetch failed for {url}: {e}");
                        format!("Fetch failed: {e}")
                    }
                };
                results.push(ToolResultBlock {
                    block_type: "tool_result",
                    tool_use_id: tool_use.id.clone().unwrap_or_default(),
                    content,
                });
            }

            messages.push(AnthropicMessage {
                role: "assistant",
                content: MessageContent::Blocks(response.content),
            });
            messages.push(AnthropicMessage {
                role: "user",
                content: MessageContent::ToolResults(results),
            });
        }

        if transcript.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(transcript)
    }

    async fn fetch_website(&self, url: &str) -> Result<String, LlmError> {
        let response = self.fetcher.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: format!("GET {url} failed"),
            });
        }
        let mut body = response.text().await?;
        if body.len() > FETCHED_BODY_LIMIT {
            let mut end = FETCHED_BODY_LIMIT;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }
        Ok(body)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError> {
        if request.website_access {
            self.complete_with_website_tool(request.prompt, request.system)
                .await
        } else {
            self.complete_text(request.prompt, request.system).await
        }
    }
}

fn website_fetch_tool() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_website",
        description: "Fetches the textual content of a public web page. \
            Use this to gather additional information from URLs mentioned \
            in candidate profiles.",
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute URL of the page to fetch"
                }
            },
            "required": ["url"]
        }),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
