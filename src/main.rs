//! tool-agent - interactive entry point.
//!
//! Runs a chat session on stdin/stdout, a single agent turn, or the
//! feedback-routing chain.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tool_agent::agent::{Agent, ChatSession, SessionReply, StructuredChatReasoner};
use tool_agent::chain::FeedbackRouter;
use tool_agent::config::{ConfigError, API_KEY_VAR};
use tool_agent::llm::{LlmClient, OpenRouterClient};
use tool_agent::tools::{ToolRegistry, Wikipedia};
use tool_agent::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tool-agent", version, about = "Chat with a tool-using agent")]
struct Cli {
    /// Override the model from DEFAULT_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    /// Override MAX_ITERATIONS
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat session (default)
    Chat,
    /// Run a single agent turn
    Ask { prompt: Vec<String> },
    /// Classify feedback and draft a matching reply
    Feedback { text: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tool_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = load_config()?;
    if let Some(model) = cli.model {
        config.default_model = model;
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations.max(1);
    }
    info!(
        "Loaded configuration: model={} max_iterations={}",
        config.default_model, config.max_iterations
    );

    let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.request_timeout,
    )?);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let agent = build_agent(&config, llm)?;
            let mut session = ChatSession::new(agent, Some(config.system_prompt.clone()));
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let interrupt = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            session.run(stdin, tokio::io::stdout(), interrupt).await?;
            session.close();
            // The stdin reader thread may still be parked in a blocking read.
            std::process::exit(0);
        }
        Command::Ask { prompt } => {
            let prompt = prompt.join(" ");
            anyhow::ensure!(!prompt.trim().is_empty(), "a prompt is required");
            let agent = build_agent(&config, llm)?;
            let mut session = ChatSession::new(agent, Some(config.system_prompt.clone()));
            match session.handle(&prompt).await {
                SessionReply::Answer(turn) => println!("Response: {}", turn.answer),
                SessionReply::Error(message) => println!("An error occurred: {}", message),
                SessionReply::Exit | SessionReply::Ignored => {}
            }
            session.close();
        }
        Command::Feedback { text } => {
            let text = text.join(" ");
            anyhow::ensure!(!text.trim().is_empty(), "feedback text is required");
            let router = FeedbackRouter::new(llm, config.completion_options());
            let reply = router.invoke(&text).await?;
            println!("{}", reply);
        }
    }

    Ok(())
}

fn build_agent(config: &Config, llm: Arc<dyn LlmClient>) -> anyhow::Result<Agent> {
    let reasoner = Arc::new(StructuredChatReasoner::new(llm, config.completion_options()));
    let wikipedia = Wikipedia::new(config.wikipedia_url.clone(), config.request_timeout);
    let tools = ToolRegistry::with_defaults(wikipedia).context("invalid tool registry")?;
    Ok(Agent::new(reasoner, tools, config.max_iterations))
}

/// Load configuration, asking for the API key on stdin when it is not set.
fn load_config() -> anyhow::Result<Config> {
    match Config::from_env() {
        Ok(config) => Ok(config),
        Err(ConfigError::MissingEnvVar(var)) if var == API_KEY_VAR => {
            eprintln!("Error: {} not found in environment or .env file", API_KEY_VAR);
            eprint!("Please enter your API key: ");
            std::io::stderr().flush()?;

            let mut key = String::new();
            std::io::stdin().lock().read_line(&mut key)?;
            let key = key.trim().to_string();
            anyhow::ensure!(!key.is_empty(), "no API key provided");
            Ok(Config::from_env_with_key(key)?)
        }
        Err(e) => Err(e.into()),
    }
}
