//! Configuration management for tool-agent.
//!
//! Configuration is read from the environment (a `.env` file is loaded first
//! when present):
//! - `OPENROUTER_API_KEY` - Required. API key for the completion endpoint.
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible API base. Defaults to `https://openrouter.ai/api/v1`.
//! - `DEFAULT_MODEL` - Optional. Model identifier. Defaults to `mistralai/mistral-7b-instruct`.
//! - `TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.1`.
//! - `MAX_TOKENS` - Optional. Completion length cap. Defaults to `512`.
//! - `MAX_ITERATIONS` - Optional. Agent reasoning iterations per turn. Defaults to `2`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. HTTP timeout for model and lookup calls. Defaults to `30`.
//! - `WIKIPEDIA_API_URL` - Optional. Wiki site root used for search and summaries. Defaults to `https://en.wikipedia.org`.
//! - `SYSTEM_PROMPT` - Optional. The session's initial system message.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::agent::{DEFAULT_MAX_ITERATIONS, DEFAULT_SYSTEM_PROMPT};
use crate::llm::{CompletionOptions, DEFAULT_BASE_URL};
use crate::tools::DEFAULT_WIKIPEDIA_URL;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Completion API key
    pub api_key: String,

    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Model identifier
    pub default_model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Maximum reasoning iterations per turn
    pub max_iterations: usize,

    /// Timeout for every outbound HTTP call
    pub request_timeout: Duration,

    /// Encyclopedia site root for search and summary calls
    pub wikipedia_url: String,

    /// Initial system message for chat sessions
    pub system_prompt: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_VAR.to_string()))?;
        Self::from_env_with_key(api_key)
    }

    /// Load everything except the API key from the environment.
    pub fn from_env_with_key(api_key: String) -> Result<Self, ConfigError> {
        let base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        validate_url("LLM_BASE_URL", &base_url)?;

        let wikipedia_url = std::env::var("WIKIPEDIA_API_URL")
            .unwrap_or_else(|_| DEFAULT_WIKIPEDIA_URL.to_string());
        validate_url("WIKIPEDIA_API_URL", &wikipedia_url)?;

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature: f32 = parse_var("TEMPERATURE", 0.1)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue(
                "TEMPERATURE".to_string(),
                format!("{} is outside 0.0..=2.0", temperature),
            ));
        }

        let max_tokens = parse_var("MAX_TOKENS", 512)?;

        let max_iterations: usize = parse_var("MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS)?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?);

        let system_prompt =
            std::env::var("SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            api_key,
            base_url,
            default_model,
            temperature,
            max_tokens,
            max_iterations,
            request_timeout,
            wikipedia_url,
            system_prompt,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model,
            temperature: 0.1,
            max_tokens: 512,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            request_timeout: Duration::from_secs(30),
            wikipedia_url: DEFAULT_WIKIPEDIA_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Sampling parameters for completion calls.
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..CompletionOptions::new(self.default_model.clone())
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("unsupported scheme: {}", other),
        )),
    }
}
