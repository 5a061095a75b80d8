use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::provider::ModelProvider;
use crate::config::AiConfig;
use crate::models::{Prompt, ResponseEnvelope, Usage};

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<MessageContent>,
    finish_reason: Option<String>,
    native_finish_reason: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenRouter (OpenAI-compatible chat completions) backend.
pub struct OpenRouterProvider {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_output_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, prompt: &Prompt, output_schema: &serde_json::Value) -> ChatRequest {
        let mut content = vec![ContentPart::Text {
            content_type: "text".to_string(),
            text: prompt.text.clone(),
        }];
        for data_uri in &prompt.media {
            content.push(ContentPart::ImageUrl {
                content_type: "image_url".to_string(),
                image_url: ImageData {
                    url: data_uri.clone(),
                },
            });
        }

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: "output".to_string(),
                    strict: false,
                    schema: output_schema.clone(),
                },
            },
        }
    }
}

#[async_trait::async_trait]
impl ModelProvider for OpenRouterProvider {
    async fn invoke(&self, prompt: &Prompt, output_schema: &serde_json::Value) -> Result<ResponseEnvelope> {
        let request = self.build_request(prompt, output_schema);

        log::info!("📤 Sending request to OpenRouter with model: {}", self.model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&request)?.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/cortex-fit")
            .header("X-Title", "Cortex Fit")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        let response_text = response.text().await?;
        if let Some(err) = status_error(status, &response_text) {
            log::error!("❌ OpenRouter API error response: {}", response_text);
            return Err(err);
        }

        log::debug!("📄 Raw OpenRouter response size: {} bytes", response_text.len());

        parse_envelope(&response_text)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

/// Error for a non-2xx reply. Rejected credentials say "API key" so the
/// pipeline passes the message through unwrapped.
fn status_error(status: StatusCode, body: &str) -> Option<anyhow::Error> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Some(anyhow::anyhow!("OpenRouter rejected the API key ({}): {}", status, body));
    }
    if !status.is_success() {
        return Some(anyhow::anyhow!("OpenRouter API error ({}): {}", status, body));
    }
    None
}

/// Map a chat-completions body onto an envelope. Missing or non-JSON
/// content yields `output: None`; finish details go to `usage`.
fn parse_envelope(response_text: &str) -> Result<ResponseEnvelope> {
    let chat_response: ChatResponse = serde_json::from_str(response_text)?;

    if let Some(error) = chat_response.error {
        anyhow::bail!("OpenRouter API error: {}", error.message);
    }

    let choice = chat_response.choices.into_iter().next();
    if choice.is_none() && chat_response.usage.is_none() {
        return Ok(ResponseEnvelope::empty(None));
    }

    let mut usage = Usage::default();
    if let Some(tokens) = &chat_response.usage {
        usage.input_tokens = tokens.prompt_tokens;
        usage.output_tokens = tokens.completion_tokens;
        usage.total_tokens = tokens.total_tokens;
    }

    let mut output = None;
    if let Some(choice) = choice {
        // Upstream reasons (e.g. Gemini's SAFETY) are more specific than the normalized ones.
        usage.finish_reason = choice.native_finish_reason.or(choice.finish_reason);
        usage.finish_message = choice.error.map(|e| e.message);

        let content = choice.message.and_then(|m| m.content).unwrap_or_default();
        output = extract_json(&content);
        if output.is_none() && !content.trim().is_empty() {
            log::warn!("⚠️ OpenRouter content was not valid JSON ({} bytes)", content.len());
        }
    }

    Ok(ResponseEnvelope {
        output,
        usage: Some(usage),
    })
}

/// Parse content as JSON, tolerating a surrounding markdown code fence.
fn extract_json(content: &str) -> Option<serde_json::Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    match serde_json::from_str::<serde_json::Value>(unfenced.trim()) {
        Ok(serde_json::Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}
