//! OpenAI-compatible chat completions client (OpenRouter by default).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, CompletionOptions, LlmClient};
use crate::error::ReasoningServiceError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Client for `{base_url}/chat/completions` with bearer auth.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReasoningServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stop: &'a [String],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, ReasoningServiceError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &options.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: &options.stop,
        };

        tracing::debug!(
            model = options.model.as_str(),
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningServiceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ReasoningServiceError::MalformedCompletion(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ReasoningServiceError::EmptyCompletion)
    }
}
