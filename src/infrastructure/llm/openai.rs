//! OpenAI-compatible provider implementation
//!
//! Works with the OpenAI API and any service exposing the same
//! `/chat/completions` contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::error::LlmError;
use super::provider::{
    CompletionRequest, CompletionResponse, LlmProvider, Message, ProviderInfo, Usage,
};

/// OpenAI-compatible chat completion provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build HTTP client with custom timeout, using default client");
                Client::new()
            });

        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|msg: &Message| OpenAiMessage {
                    role: msg.role.as_str().to_string(),
                    content: Some(msg.content.clone()),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn parse_openai_response(&self, response: OpenAiResponse) -> CompletionResponse {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        CompletionResponse {
            id: response.id,
            model: response.model,
            content,
            usage,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "openai",
            name: "OpenAI",
        }
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = self.chat_url();
        let openai_request = self.to_openai_request(&request);

        debug!(model = %openai_request.model, "Sending request to OpenAI-compatible API");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited(text));
            } else if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LlmError::auth(text));
            } else if status.as_u16() >= 500 {
                return Err(LlmError::ServiceUnavailable(text));
            }

            error!(status = %status, "OpenAI API error: {}", text);
            return Err(LlmError::invalid_response(format!(
                "API error {}: {}",
                status, text
            )));
        }

        let openai_response: OpenAiResponse = response.json().await?;
        Ok(self.parse_openai_response(openai_response))
    }
}

// === OpenAI API types ===

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
