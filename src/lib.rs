//! # tool-agent
//!
//! A conversational agent that answers with the help of tools.
//!
//! This library provides:
//! - A tool registry with typed input contracts
//! - A session-owned conversation history
//! - An agent loop that lets a language model call tools a bounded number of
//!   times per turn
//! - Prompt templates and keyword-routed chains
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Append the user's utterance to the conversation
//! 2. Ask the reasoning service for a final answer or a tool call
//! 3. Execute requested tools and feed their output back
//! 4. Stop at a final answer or when the iteration cap is reached
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tool_agent::{agent::{Agent, ChatSession, StructuredChatReasoner}, llm::OpenRouterClient};
//!
//! let config = tool_agent::Config::from_env()?;
//! let llm = Arc::new(OpenRouterClient::new(
//!     &config.api_key,
//!     &config.base_url,
//!     config.request_timeout,
//! )?);
//! let reasoner = Arc::new(StructuredChatReasoner::new(llm, config.completion_options()));
//! let agent = Agent::new(reasoner, tools, config.max_iterations);
//! let mut session = ChatSession::new(agent, Some(config.system_prompt.clone()));
//! let reply = session.handle("What time is it?").await;
//! ```

pub mod agent;
pub mod chain;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod tools;

pub use config::Config;
