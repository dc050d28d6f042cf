/// LLM Client: the single point of entry for all completion API calls.
///
/// No other module may call the OpenAI API directly. Callers depend on the
/// [`StructuredCompletion`] trait so tests can substitute a canned backend.
///
/// One request per call: there is no retry or backoff here. A failed
/// completion is terminal for the request that asked for it.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM refused the request: {0}")]
    Refusal(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A completion constrained to a JSON schema.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    /// System instructions, sent in order before the user message.
    pub system: &'a [&'a str],
    pub user: &'a str,
    pub schema_name: &'a str,
    pub schema: &'a Value,
}

/// Structured-output completion service.
#[async_trait]
pub trait StructuredCompletion: Send + Sync {
    /// Returns the model's output parsed as JSON. Conformance to the schema is
    /// the caller's to check.
    async fn complete(&self, request: StructuredRequest<'_>) -> Result<Value, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat<'a> {
    JsonSchema { json_schema: JsonSchemaFormat<'a> },
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn refusal(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.refusal.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production LLM client, wrapping the OpenAI chat completions API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes one call to the API, returning the full response object.
    pub async fn call(&self, request: StructuredRequest<'_>) -> Result<LlmResponse, LlmError> {
        let mut messages: Vec<ChatMessage<'_>> = request
            .system
            .iter()
            .copied()
            .map(|content| ChatMessage {
                role: "system",
                content,
            })
            .collect();
        messages.push(ChatMessage {
            role: "user",
            content: request.user,
        });

        let body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages,
            response_format: ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    strict: true,
                    schema: request.schema,
                },
            },
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl StructuredCompletion for LlmClient {
    async fn complete(&self, request: StructuredRequest<'_>) -> Result<Value, LlmError> {
        let response = self.call(request).await?;
        parse_structured_output(&response)
    }
}

/// Pulls the JSON document out of a completion response.
fn parse_structured_output(response: &LlmResponse) -> Result<Value, LlmError> {
    if let Some(refusal) = response.refusal() {
        return Err(LlmError::Refusal(refusal.to_string()));
    }
    let text = response.text().ok_or(LlmError::EmptyContent)?;

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(text);

    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
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
