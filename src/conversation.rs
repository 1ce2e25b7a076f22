//! Session-scoped conversation history.

use serde::{Deserialize, Serialize};

use crate::error::InvalidSequenceError;

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    System(String),
    User(String),
    Assistant(String),
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self::System(text.into())
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::User(text.into())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::System(text) | Self::User(text) | Self::Assistant(text) => text,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }
}

/// Ordered, append-only history owned by one session.
///
/// A `System` message may only be the first entry; every later `System`
/// append fails with [`InvalidSequenceError`].
#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation seeded with a system message.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::System(prompt.into())],
        }
    }

    pub fn append(&mut self, message: Message) -> Result<(), InvalidSequenceError> {
        if message.is_system() && !self.messages.is_empty() {
            return Err(InvalidSequenceError {
                existing: self.messages.len(),
            });
        }
        self.messages.push(message);
        Ok(())
    }

    /// Copy of the history; mutating it never touches the session.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clear the history at session teardown.
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_message_is_accepted_first() {
        let mut state = ConversationState::new();
        state.append(Message::system("be helpful")).expect("first system");
        state.append(Message::user("hi")).expect("user");
        assert_eq!(state.len(), 2);
        assert_eq!(state.snapshot()[0], Message::system("be helpful"));
    }

    #[test]
    fn second_system_message_is_rejected() {
        let mut state = ConversationState::with_system("first");
        let err = state
            .append(Message::system("second"))
            .expect_err("second system must fail");
        assert_eq!(err.existing, 1);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn system_after_user_is_rejected() {
        let mut state = ConversationState::new();
        state.append(Message::user("hello")).unwrap();
        assert!(state.append(Message::system("late")).is_err());
        assert_eq!(state.snapshot(), vec![Message::user("hello")]);
    }

    #[test]
    fn user_and_assistant_may_alternate_freely() {
        let mut state = ConversationState::new();
        state.append(Message::assistant("unprompted")).unwrap();
        state.append(Message::assistant("again")).unwrap();
        state.append(Message::user("ok")).unwrap();
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn snapshot_is_stable_and_detached() {
        let mut state = ConversationState::with_system("sys");
        state.append(Message::user("a")).unwrap();

        let mut first = state.snapshot();
        let second = state.snapshot();
        assert_eq!(first, second);

        first.push(Message::assistant("out of band"));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn reset_clears_history() {
        let mut state = ConversationState::with_system("sys");
        state.append(Message::user("a")).unwrap();
        state.reset();
        assert!(state.is_empty());
        state.append(Message::system("fresh")).expect("system allowed after reset");
    }

    #[test]
    fn message_serializes_with_role_tag() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
