use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tool_agent::agent::{Agent, ChatSession, SessionReply, StructuredChatReasoner, TurnOutcome};
use tool_agent::conversation::Message;
use tool_agent::error::{ReasoningServiceError, ToolError};
use tool_agent::llm::{
    ChatMessage, CompletionOptions, Decision, LlmClient, ReasoningRequest, ReasoningService,
};
use tool_agent::tools::{InputContract, Tool, ToolInput, ToolRegistry};

/// Hands out scripted decisions in order.
struct Script(Mutex<Vec<Decision>>);

impl Script {
    fn new(decisions: Vec<Decision>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(decisions)))
    }
}

#[async_trait]
impl ReasoningService for Script {
    async fn reason(
        &self,
        _request: &ReasoningRequest<'_>,
    ) -> Result<Decision, ReasoningServiceError> {
        let mut decisions = self.0.lock().await;
        if decisions.is_empty() {
            return Err(ReasoningServiceError::EmptyCompletion);
        }
        Ok(decisions.remove(0))
    }
}

struct FixedTime;

#[async_trait]
impl Tool for FixedTime {
    fn name(&self) -> &str {
        "Time"
    }

    fn description(&self) -> &str {
        "Useful for when you need to know the current time."
    }

    fn input_contract(&self) -> InputContract {
        InputContract::None
    }

    async fn execute(&self, _input: ToolInput) -> Result<String, ToolError> {
        Ok("12:00 PM".to_string())
    }
}

struct Broken;

#[async_trait]
impl Tool for Broken {
    fn name(&self) -> &str {
        "Broken"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    fn input_contract(&self) -> InputContract {
        InputContract::None
    }

    async fn execute(&self, _input: ToolInput) -> Result<String, ToolError> {
        Err(ToolError::Failed("backend unavailable".to_string()))
    }
}

fn tool_call(name: &str) -> Decision {
    Decision::ToolCall {
        name: name.to_string(),
        input: Value::Null,
    }
}

fn registry() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(FixedTime)).expect("register Time");
    tools.register(Arc::new(Broken)).expect("register Broken");
    tools
}

fn session(script: Arc<Script>, max_iterations: usize) -> ChatSession {
    let agent = Agent::new(script, registry(), max_iterations);
    ChatSession::new(agent, Some("You are an AI assistant.".to_string()))
}

#[tokio::test]
async fn time_question_is_answered_through_the_tool() {
    let script = Script::new(vec![
        tool_call("Time"),
        Decision::FinalAnswer("It is 12:00 PM.".to_string()),
    ]);
    let mut session = session(script, 2);

    let SessionReply::Answer(turn) = session.handle("what time is it?").await else {
        panic!("expected an answer");
    };

    assert_eq!(turn.answer, "It is 12:00 PM.");
    assert_eq!(turn.outcome, TurnOutcome::Answered);
    assert_eq!(
        session.conversation().last(),
        Some(&Message::assistant("It is 12:00 PM."))
    );
}

#[tokio::test]
async fn exit_keyword_ends_session_without_new_messages() {
    let mut session = session(Script::new(Vec::new()), 2);
    let before = session.conversation().snapshot();

    assert!(matches!(session.handle("exit").await, SessionReply::Exit));
    assert_eq!(session.conversation().snapshot(), before);
}

#[tokio::test]
async fn failing_tool_yields_diagnostic_and_session_continues() {
    let script = Script::new(vec![
        tool_call("Broken"),
        tool_call("Broken"),
        Decision::FinalAnswer("Hello again.".to_string()),
    ]);
    let mut session = session(script, 2);

    let SessionReply::Answer(turn) = session.handle("use the broken tool").await else {
        panic!("expected a degraded answer");
    };
    assert_eq!(turn.outcome, TurnOutcome::Degraded);
    assert!(turn.answer.contains("Broken"));
    assert!(turn.answer.contains("Error"));
    let history = session.conversation().snapshot();
    assert!(!history.iter().any(|m| matches!(m, Message::Assistant(_))));

    let SessionReply::Answer(turn) = session.handle("hi").await else {
        panic!("expected an answer");
    };
    assert_eq!(turn.answer, "Hello again.");
    assert_eq!(
        session.conversation().snapshot(),
        vec![
            Message::system("You are an AI assistant."),
            Message::user("use the broken tool"),
            Message::user("hi"),
            Message::assistant("Hello again."),
        ]
    );
}

#[tokio::test]
async fn unknown_tool_never_raises() {
    let script = Script::new(vec![
        tool_call("Calculator"),
        Decision::FinalAnswer("No calculator here.".to_string()),
    ]);
    let mut session = session(script, 2);

    let SessionReply::Answer(turn) = session.handle("2+2?").await else {
        panic!("expected an answer");
    };
    assert!(turn.steps[0].output.contains("unknown tool 'Calculator'"));
    assert_eq!(turn.answer, "No calculator here.");
}

#[tokio::test]
async fn reasoning_failure_drops_turn_only() {
    let mut session = session(Script::new(Vec::new()), 2);

    let SessionReply::Error(message) = session.handle("hello?").await else {
        panic!("expected an error reply");
    };
    assert!(message.contains("no content"));
    assert!(matches!(session.conversation().last(), Some(Message::User(_))));
}

/// Chat model double that returns canned completions.
struct CannedModel(Mutex<Vec<&'static str>>);

#[async_trait]
impl LlmClient for CannedModel {
    async fn chat_completion(
        &self,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String, ReasoningServiceError> {
        let mut replies = self.0.lock().await;
        if replies.is_empty() {
            return Err(ReasoningServiceError::EmptyCompletion);
        }
        Ok(replies.remove(0).to_string())
    }
}

#[tokio::test]
async fn structured_chat_reasoner_drives_a_full_turn() {
    let model = Arc::new(CannedModel(Mutex::new(vec![
        "```json\n{\"action\": \"Time\", \"action_input\": {}}\n```",
        "{\"action\": \"Final Answer\", \"action_input\": \"It is 12:00 PM.\"}",
    ])));
    let reasoner = Arc::new(StructuredChatReasoner::new(model, CompletionOptions::new("test")));
    let agent = Agent::new(reasoner, registry(), 2);
    let mut session = ChatSession::new(agent, None);

    let SessionReply::Answer(turn) = session.handle("what time is it?").await else {
        panic!("expected an answer");
    };
    assert_eq!(turn.steps.len(), 1);
    assert_eq!(turn.steps[0].output, "12:00 PM");
    assert_eq!(turn.answer, "It is 12:00 PM.");
}

#[tokio::test]
async fn prose_reply_from_model_is_the_answer() {
    let model = Arc::new(CannedModel(Mutex::new(vec![
        "Hello! I'm doing well, thanks for asking.",
    ])));
    let reasoner = Arc::new(StructuredChatReasoner::new(model, CompletionOptions::new("test")));
    let mut session = ChatSession::new(Agent::new(reasoner, registry(), 2), None);

    let SessionReply::Answer(turn) = session.handle("how are you?").await else {
        panic!("expected an answer");
    };
    assert_eq!(turn.outcome, TurnOutcome::Answered);
    assert!(turn.steps.is_empty());
    assert_eq!(
        session.conversation().snapshot(),
        vec![
            Message::user("how are you?"),
            Message::assistant("Hello! I'm doing well, thanks for asking."),
        ]
    );
}

#[tokio::test]
async fn action_blob_without_action_is_a_dropped_turn() {
    let model = Arc::new(CannedModel(Mutex::new(vec![r#"{"action_input": "noon"}"#])));
    let reasoner = Arc::new(StructuredChatReasoner::new(model, CompletionOptions::new("test")));
    let mut session = ChatSession::new(Agent::new(reasoner, registry(), 2), None);

    let SessionReply::Error(message) = session.handle("time?").await else {
        panic!("expected an error reply");
    };
    assert!(message.contains("malformed completion"));
    assert_eq!(session.conversation().len(), 1);
}
