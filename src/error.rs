//! Error taxonomy for the agent core.
//!
//! Per-turn faults (`ToolError`, `UnknownToolError`, `ReasoningServiceError`)
//! are recovered inside the session. `DuplicateNameError` is a startup
//! misconfiguration and `InvalidSequenceError` a caller contract violation.

use thiserror::Error;

/// A tool handler failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The input did not match the tool's declared contract.
    #[error("invalid input for tool '{tool}': {reason}")]
    InvalidInput { tool: String, reason: String },

    /// An external knowledge lookup found nothing or could not be reached.
    #[error("lookup failed for '{query}': {reason}")]
    Lookup { query: String, reason: String },

    /// Any other handler failure.
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn invalid_input(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn lookup(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Lookup {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// The reasoning service asked for a tool the registry does not know.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown tool '{0}'")]
pub struct UnknownToolError(pub String);

/// A second tool was registered under an existing name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("a tool named '{0}' is already registered")]
pub struct DuplicateNameError(pub String);

/// A `System` message was appended after the conversation had started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("system message must come first; conversation already has {existing} message(s)")]
pub struct InvalidSequenceError {
    pub existing: usize,
}

/// Talking to the hosted completion API failed.
#[derive(Debug, Error)]
pub enum ReasoningServiceError {
    #[error("network error calling completion API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("completion API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed completion: {0}")]
    MalformedCompletion(String),

    #[error("completion API returned no content")]
    EmptyCompletion,
}

/// A turn could not produce an answer.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Reasoning(#[from] ReasoningServiceError),

    #[error(transparent)]
    Sequence(#[from] InvalidSequenceError),
}

/// Failure while formatting or running a prompt chain.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("missing value for template variable '{0}'")]
    MissingVariable(String),

    #[error("unterminated placeholder in template: {0}")]
    UnterminatedPlaceholder(String),

    #[error(transparent)]
    Reasoning(#[from] ReasoningServiceError),
}
