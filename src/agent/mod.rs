//! Agent module - the conversational tool-using agent.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Append the user utterance to the conversation
//! 2. Ask the reasoning service for a decision, offering the registered tools
//! 3. If it requests a tool call, execute it and feed the result back
//! 4. Repeat until a final answer or the iteration cap is reached

mod agent_loop;
mod prompt;
mod session;
mod structured_chat;

pub use agent_loop::{Agent, AgentTurn, TurnOutcome, DEFAULT_MAX_ITERATIONS};
pub use prompt::{build_system_prompt, DEFAULT_SYSTEM_PROMPT};
pub use session::{is_exit_keyword, ChatSession, SessionReply};
pub use structured_chat::{parse_decision, StructuredChatReasoner};
