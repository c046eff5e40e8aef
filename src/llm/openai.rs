//! `OpenAI`-compatible chat completions provider

use super::types::{LlmMessage, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// `OpenAI`-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl OpenAIService {
    pub fn new(
        api_key: String,
        model_id: impl Into<String>,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            model_id: model_id.into(),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if !request.system.is_empty() {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: request.system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(Self::translate_message));

        OpenAIRequest {
            model: self.model_id.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_output.then(|| ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        }
    }

    fn translate_message(msg: &LlmMessage) -> OpenAIMessage {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        OpenAIMessage {
            role: role.to_string(),
            content: msg.text.clone(),
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed("No choices in response"))?;

        Ok(LlmResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: Usage {
                input_tokens: u64::from(resp.usage.prompt_tokens),
                output_tokens: u64::from(resp.usage.completion_tokens),
            },
        })
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::timeout(format!("Request timeout: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<OpenAIErrorResponse>(&body) {
                return Err(LlmError::status(format!(
                    "HTTP {status}: {}",
                    error_resp.error.message
                )));
            }
            return Err(LlmError::status(format!("HTTP {status} error: {body}")));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(openai_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
