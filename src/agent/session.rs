//! Interactive chat session over a line-oriented input/output pair.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::Instrument;
use uuid::Uuid;

use super::agent_loop::{Agent, AgentTurn};
use crate::conversation::ConversationState;

const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "bye"];

pub fn is_exit_keyword(input: &str) -> bool {
    EXIT_KEYWORDS
        .iter()
        .any(|k| input.trim().eq_ignore_ascii_case(k))
}

/// Result of feeding one line to the session.
#[derive(Debug)]
pub enum SessionReply {
    /// The user asked to end the session.
    Exit,
    /// Blank input; nothing happened.
    Ignored,
    /// The turn produced an answer (final or degraded).
    Answer(AgentTurn),
    /// The turn was dropped; the text is shown to the user only.
    Error(String),
}

/// One conversation with one agent.
pub struct ChatSession {
    id: Uuid,
    agent: Agent,
    conversation: ConversationState,
}

impl ChatSession {
    pub fn new(agent: Agent, system_prompt: Option<String>) -> Self {
        let conversation = match system_prompt {
            Some(prompt) => ConversationState::with_system(prompt),
            None => ConversationState::new(),
        };
        Self {
            id: Uuid::new_v4(),
            agent,
            conversation,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Process one line of user input.
    pub async fn handle(&mut self, input: &str) -> SessionReply {
        let input = input.trim();
        if input.is_empty() {
            return SessionReply::Ignored;
        }
        if is_exit_keyword(input) {
            return SessionReply::Exit;
        }

        let span = tracing::info_span!("turn", session = %self.id);
        match self
            .agent
            .run_turn(&mut self.conversation, input)
            .instrument(span)
            .await
        {
            Ok(turn) => SessionReply::Answer(turn),
            Err(e) => {
                let message = format!(
                    "I encountered an error while processing your request: {}",
                    e
                );
                tracing::error!("{}", message);
                SessionReply::Error(message)
            }
        }
    }

    /// Read lines from `input` until an exit keyword, end of input, or
    /// `interrupt` resolves, printing replies to `output`.
    ///
    /// `interrupt` is only observed while waiting for input.
    pub async fn run<R, W, I>(
        &mut self,
        input: R,
        mut output: W,
        interrupt: I,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        I: Future<Output = ()>,
    {
        tracing::info!(session = %self.id, "Chat session started");
        let mut lines = input.lines();
        tokio::pin!(interrupt);

        loop {
            output.write_all(b"User: ").await?;
            output.flush().await?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = &mut interrupt => {
                    output.write_all(b"\nBot: Session terminated by user.\n").await?;
                    break;
                }
            };

            let Some(line) = line else {
                output.write_all(b"\nBot: Goodbye!\n").await?;
                break;
            };

            match self.handle(&line).await {
                SessionReply::Exit => {
                    output.write_all(b"Bot: Goodbye!\n").await?;
                    break;
                }
                SessionReply::Ignored => {}
                SessionReply::Answer(turn) => {
                    output
                        .write_all(format!("Bot: {}\n", turn.answer).as_bytes())
                        .await?;
                }
                SessionReply::Error(message) => {
                    output
                        .write_all(format!("Bot: {}\n", message).as_bytes())
                        .await?;
                }
            }
        }

        output.flush().await?;
        tracing::info!(session = %self.id, "Chat session ended");
        Ok(())
    }

    /// Tear the session down, discarding its history.
    pub fn close(mut self) {
        self.conversation.reset();
        tracing::debug!(session = %self.id, "Conversation cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;
    use crate::error::ReasoningServiceError;
    use crate::llm::{Decision, ReasoningRequest, ReasoningService};
    use crate::tools::ToolRegistry;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Answers by echoing the latest user message, or fails on "fail".
    struct Echo;

    #[async_trait]
    impl ReasoningService for Echo {
        async fn reason(
            &self,
            request: &ReasoningRequest<'_>,
        ) -> Result<Decision, ReasoningServiceError> {
            let last = request.history.last().map(Message::text).unwrap_or_default();
            if last == "fail" {
                return Err(ReasoningServiceError::MalformedCompletion("garbage".into()));
            }
            Ok(Decision::FinalAnswer(format!("echo: {}", last)))
        }
    }

    fn session() -> ChatSession {
        let agent = Agent::new(Arc::new(Echo), ToolRegistry::new(), 2);
        ChatSession::new(agent, Some("You are a test.".into()))
    }

    #[test]
    fn exit_keywords_are_case_insensitive() {
        for word in ["exit", "QUIT", "Bye", "  bye  "] {
            assert!(is_exit_keyword(word), "{word}");
        }
        assert!(!is_exit_keyword("goodbye"));
        assert!(!is_exit_keyword("exit now"));
    }

    #[tokio::test]
    async fn exit_appends_nothing() {
        let mut session = session();
        assert!(matches!(session.handle("Exit").await, SessionReply::Exit));
        assert_eq!(session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut session = session();
        assert!(matches!(session.handle("   ").await, SessionReply::Ignored));
        assert_eq!(session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn failed_turn_is_reported_but_not_recorded() {
        let mut session = session();
        let reply = session.handle("fail").await;
        let SessionReply::Error(message) = reply else {
            panic!("expected error reply");
        };
        assert!(message.contains("malformed completion"));
        assert!(!session
            .conversation()
            .snapshot()
            .iter()
            .any(|m| matches!(m, Message::Assistant(_))));

        let reply = session.handle("hello").await;
        assert!(matches!(reply, SessionReply::Answer(ref t) if t.answer == "echo: hello"));
    }

    #[tokio::test]
    async fn run_prints_replies_until_exit() {
        let mut session = session();
        let input: &[u8] = b"hello\n\nbye\nnever read\n";
        let mut output = Vec::new();

        session
            .run(input, &mut output, std::future::pending())
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "User: Bot: echo: hello\nUser: User: Bot: Goodbye!\n"
        );
        assert_eq!(
            session.conversation().snapshot(),
            vec![
                Message::system("You are a test."),
                Message::user("hello"),
                Message::assistant("echo: hello"),
            ]
        );
    }

    #[tokio::test]
    async fn run_ends_on_end_of_input() {
        let mut session = session();
        let mut output = Vec::new();
        session
            .run(&b"hi\n"[..], &mut output, std::future::pending())
            .await
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("Bot: Goodbye!\n"));
    }

    #[tokio::test]
    async fn interrupt_while_waiting_terminates_session() {
        let mut session = session();
        let (_writer, reader) = tokio::io::duplex(64);
        let reader = tokio::io::BufReader::new(reader);
        let mut output = Vec::new();

        session
            .run(reader, &mut output, std::future::ready(()))
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "User: \nBot: Session terminated by user.\n");
        assert_eq!(session.conversation().len(), 1);
    }
}
