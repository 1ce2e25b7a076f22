//! Core agent loop implementation.

use std::sync::Arc;

use serde_json::Value;

use crate::conversation::{ConversationState, Message};
use crate::error::{ToolError, TurnError, UnknownToolError};
use crate::llm::{Decision, ReasoningRequest, ReasoningService, ToolStep};
use crate::tools::ToolRegistry;

/// Iteration cap used by the shipped configurations.
pub const DEFAULT_MAX_ITERATIONS: usize = 2;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reasoning service produced a final answer.
    Answered,
    /// The iteration cap ran out first.
    Degraded,
}

/// One processed user utterance.
#[derive(Debug, Clone)]
pub struct AgentTurn {
    pub utterance: String,
    pub steps: Vec<ToolStep>,
    pub answer: String,
    pub outcome: TurnOutcome,
}

/// The tool-using agent.
pub struct Agent {
    reasoner: Arc<dyn ReasoningService>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl Agent {
    /// Create an agent. The registry is fixed from here on.
    pub fn new(
        reasoner: Arc<dyn ReasoningService>,
        tools: ToolRegistry,
        max_iterations: usize,
    ) -> Self {
        Self {
            reasoner,
            tools,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run one turn: record the utterance, reason and dispatch tools until a
    /// final answer or the iteration cap, then record the answer.
    ///
    /// Only a final answer is appended to `conversation`. A degraded answer
    /// is returned but leaves the history untouched.
    pub async fn run_turn(
        &self,
        conversation: &mut ConversationState,
        utterance: &str,
    ) -> Result<AgentTurn, TurnError> {
        conversation.append(Message::user(utterance))?;
        tracing::info!("User input: {}", utterance);

        let history = conversation.snapshot();
        let tools = self.tools.list();
        let mut steps: Vec<ToolStep> = Vec::new();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let request = ReasoningRequest {
                history: &history,
                tools: &tools,
                steps: &steps,
                iteration,
                max_iterations: self.max_iterations,
            };

            match self.reasoner.reason(&request).await? {
                Decision::FinalAnswer(answer) => {
                    tracing::info!("Bot response: {}", answer);
                    conversation.append(Message::assistant(answer.clone()))?;
                    return Ok(AgentTurn {
                        utterance: utterance.to_string(),
                        steps,
                        answer,
                        outcome: TurnOutcome::Answered,
                    });
                }
                Decision::ToolCall { name, input } => {
                    tracing::info!("Calling tool: {} with args: {}", name, input);
                    let output = self.execute_tool_call(&name, &input).await;
                    tracing::debug!("Tool result: {}", truncate_for_log(&output, 1000));
                    steps.push(ToolStep {
                        tool: name,
                        input,
                        output,
                    });
                }
            }
        }

        let answer = degraded_answer(self.max_iterations, steps.last());
        tracing::warn!(
            "Max iterations ({}) reached without a final answer",
            self.max_iterations
        );
        Ok(AgentTurn {
            utterance: utterance.to_string(),
            steps,
            answer,
            outcome: TurnOutcome::Degraded,
        })
    }

    /// Execute a single tool call, turning every failure into text for the model.
    async fn execute_tool_call(&self, name: &str, input: &Value) -> String {
        let Some(tool) = self.tools.resolve(name) else {
            let err = UnknownToolError(name.to_string());
            tracing::warn!("{}", err);
            return format!(
                "Error: {}. Available tools: {}",
                err,
                self.tools.names().join(", ")
            );
        };

        let input = match tool.input_contract().validate(name, input) {
            Ok(input) => input,
            Err(e) => return format!("Error: {}", e),
        };

        // Run the handler on its own task so a panic is contained like any other failure.
        let result = tokio::spawn(async move { tool.execute(input).await })
            .await
            .unwrap_or_else(|e| Err(ToolError::Failed(format!("handler aborted: {}", e))));

        match result {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {}", name, e);
                format!("Error: tool '{}' failed: {}", name, e)
            }
        }
    }
}

fn degraded_answer(max_iterations: usize, last: Option<&ToolStep>) -> String {
    let head = format!(
        "Agent stopped after {} iterations without a final answer.",
        max_iterations
    );
    match last {
        Some(step) => format!(
            "{} Last observation from '{}': {}",
            head, step.tool, step.output
        ),
        None => head,
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}
