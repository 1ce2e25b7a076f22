//! The reasoning-service boundary used by the agent loop.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::conversation::Message;
use crate::error::ReasoningServiceError;
use crate::tools::ToolSpec;

/// What the reasoning service wants to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    FinalAnswer(String),
    ToolCall { name: String, input: Value },
}

/// One executed tool call within the current turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStep {
    pub tool: String,
    pub input: Value,
    pub output: String,
}

/// Everything the service sees for one reasoning iteration.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningRequest<'a> {
    /// Conversation so far, including the current user utterance.
    pub history: &'a [Message],
    pub tools: &'a [ToolSpec],
    /// Tool calls already executed this turn, oldest first.
    pub steps: &'a [ToolStep],
    /// Zero-based index of this iteration.
    pub iteration: usize,
    pub max_iterations: usize,
}

impl ReasoningRequest<'_> {
    pub fn is_last_iteration(&self) -> bool {
        self.iteration + 1 >= self.max_iterations
    }
}

#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn reason(
        &self,
        request: &ReasoningRequest<'_>,
    ) -> Result<Decision, ReasoningServiceError>;
}
