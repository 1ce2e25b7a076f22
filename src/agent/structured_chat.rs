//! Reasoning service that drives a chat model with JSON action blobs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::prompt::{build_system_prompt, FINAL_STEP_NOTICE, JSON_REMINDER};
use crate::conversation::Message;
use crate::error::ReasoningServiceError;
use crate::llm::{
    ChatMessage, CompletionOptions, Decision, LlmClient, ReasoningRequest, ReasoningService, Role,
};

const FINAL_ACTION: &str = "Final Answer";

/// Asks the model for one `{"action", "action_input"}` blob per iteration.
pub struct StructuredChatReasoner {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl StructuredChatReasoner {
    pub fn new(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    /// Lay out the prompt for one iteration.
    pub fn render(request: &ReasoningRequest<'_>) -> Vec<ChatMessage> {
        let instructions = request
            .history
            .first()
            .filter(|m| m.is_system())
            .map(Message::text);

        let mut messages = vec![ChatMessage::new(
            Role::System,
            build_system_prompt(instructions, request.tools),
        )];
        messages.extend(
            request
                .history
                .iter()
                .filter(|m| !m.is_system())
                .map(ChatMessage::from),
        );

        for step in request.steps {
            let blob = json!({"action": step.tool, "action_input": step.input});
            messages.push(ChatMessage::new(
                Role::Assistant,
                format!("```\n{:#}\n```", blob),
            ));
            messages.push(ChatMessage::new(
                Role::User,
                format!("Observation: {}", step.output),
            ));
        }

        let mut suffix = JSON_REMINDER.to_string();
        if request.is_last_iteration() {
            suffix = format!("{}\n{}", FINAL_STEP_NOTICE, suffix);
        }
        match messages.last_mut() {
            Some(last) if last.role == Role::User => {
                last.content = format!("{}\n\n{}", last.content, suffix);
            }
            _ => messages.push(ChatMessage::new(Role::User, suffix)),
        }

        messages
    }
}

#[async_trait]
impl ReasoningService for StructuredChatReasoner {
    async fn reason(
        &self,
        request: &ReasoningRequest<'_>,
    ) -> Result<Decision, ReasoningServiceError> {
        let messages = Self::render(request);
        let completion = self.llm.chat_completion(&messages, &self.options).await?;
        tracing::debug!(iteration = request.iteration, "Model output: {}", completion);
        parse_decision(&completion)
    }
}

/// Parse a model reply into a [`Decision`].
///
/// A reply without any JSON blob is taken as the final answer itself.
pub fn parse_decision(content: &str) -> Result<Decision, ReasoningServiceError> {
    let Some(value) = extract_json(content) else {
        let answer = content.trim();
        if answer.is_empty() {
            return Err(ReasoningServiceError::EmptyCompletion);
        }
        tracing::debug!("No action blob in model output, treating it as the final answer");
        return Ok(Decision::FinalAnswer(answer.to_string()));
    };

    let Value::Object(map) = value else {
        return Err(ReasoningServiceError::MalformedCompletion(
            "action blob must be a JSON object".into(),
        ));
    };

    let action = map
        .get("action")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| {
            ReasoningServiceError::MalformedCompletion("missing \"action\" field".into())
        })?;
    let input = map.get("action_input").cloned().unwrap_or(Value::Null);

    if action.eq_ignore_ascii_case(FINAL_ACTION) {
        let answer = match input {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return Ok(Decision::FinalAnswer(answer));
    }

    Ok(Decision::ToolCall {
        name: action.to_string(),
        input,
    })
}

fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(start) = trimmed.find("```") {
        let fenced = &trimmed[start + 3..];
        let fenced = fenced
            .strip_prefix("json")
            .or_else(|| fenced.strip_prefix("JSON"))
            .unwrap_or(fenced);
        if let Some(end) = fenced.find("```") {
            if let Ok(value) = serde_json::from_str::<Value>(fenced[..end].trim()) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    None
}
