//! Language model access.
//!
//! Two layers:
//! - [`LlmClient`]: a raw chat-completion call against an OpenAI-compatible API
//! - [`ReasoningService`]: the agent-facing decision step, returning either a
//!   final answer or a tool call

mod openrouter;
mod reasoning;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::Message;
use crate::error::ReasoningServiceError;

pub use openrouter::{OpenRouterClient, DEFAULT_BASE_URL};
pub use reasoning::{Decision, ReasoningRequest, ReasoningService, ToolStep};

/// Message role in the completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in the completion API wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
        };
        Self::new(role, message.text())
    }
}

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

impl CompletionOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.1,
            max_tokens: 512,
            stop: vec!["Human:".to_string(), "User:".to_string()],
        }
    }
}

/// Chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Return the text of the first completion choice.
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, ReasoningServiceError>;
}
