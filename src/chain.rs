//! Prompt templates, single-prompt chains and keyword branching.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ChainError;
use crate::llm::{ChatMessage, CompletionOptions, LlmClient, Role};

pub type Variables = HashMap<String, String>;

/// Build a [`Variables`] map from string pairs.
pub fn vars<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Variables {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Ordered chat messages with `{name}` placeholders.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    messages: Vec<(Role, String)>,
}

impl PromptTemplate {
    pub fn from_messages<S: Into<String>>(messages: impl IntoIterator<Item = (Role, S)>) -> Self {
        Self {
            messages: messages.into_iter().map(|(r, t)| (r, t.into())).collect(),
        }
    }

    /// Placeholder names, in order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (_, template) in &self.messages {
            let mut chars = template.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '{' if chars.peek() == Some(&'{') => {
                        chars.next();
                    }
                    '{' => {
                        let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                    _ => {}
                }
            }
        }
        names
    }

    pub fn format(&self, vars: &Variables) -> Result<Vec<ChatMessage>, ChainError> {
        self.messages
            .iter()
            .map(|(role, template)| Ok(ChatMessage::new(*role, render(template, vars)?)))
            .collect()
    }
}

fn render(template: &str, vars: &Variables) -> Result<String, ChainError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            let end = tail
                .find('}')
                .ok_or_else(|| ChainError::UnterminatedPlaceholder(template.to_string()))?;
            let name = tail[1..end].trim();
            let value = vars
                .get(name)
                .ok_or_else(|| ChainError::MissingVariable(name.to_string()))?;
            out.push_str(value);
            rest = &tail[end + 1..];
        } else {
            // A lone '}' is kept as-is.
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Template -> model -> trimmed string.
#[derive(Clone)]
pub struct LlmChain {
    template: PromptTemplate,
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl LlmChain {
    pub fn new(
        template: PromptTemplate,
        llm: Arc<dyn LlmClient>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            template,
            llm,
            options,
        }
    }

    pub async fn invoke(&self, vars: &Variables) -> Result<String, ChainError> {
        let messages = self.template.format(vars)?;
        let output = self.llm.chat_completion(&messages, &self.options).await?;
        Ok(output.trim().to_string())
    }
}

/// Picks the first chain whose keyword appears in the routing text.
#[derive(Clone)]
pub struct Branch {
    routes: Vec<(String, LlmChain)>,
    default: LlmChain,
}

impl Branch {
    pub fn new(default: LlmChain) -> Self {
        Self {
            routes: Vec::new(),
            default,
        }
    }

    pub fn route_on(mut self, keyword: impl Into<String>, chain: LlmChain) -> Self {
        self.routes.push((keyword.into().to_lowercase(), chain));
        self
    }

    /// Keyword of the chosen route, or `None` for the default chain.
    pub fn select(&self, routing_text: &str) -> (Option<&str>, &LlmChain) {
        let text = routing_text.to_lowercase();
        self.routes
            .iter()
            .find(|(keyword, _)| text.contains(keyword.as_str()))
            .map(|(keyword, chain)| (Some(keyword.as_str()), chain))
            .unwrap_or((None, &self.default))
    }

    pub async fn invoke(&self, routing_text: &str, vars: &Variables) -> Result<String, ChainError> {
        let (keyword, chain) = self.select(routing_text);
        tracing::info!(route = keyword.unwrap_or("default"), "Branch selected");
        chain.invoke(vars).await
    }
}

const ASSISTANT_PREAMBLE: &str = "You are a helpful assistant.";

fn feedback_template(instruction: &str) -> PromptTemplate {
    PromptTemplate::from_messages([
        (Role::System, ASSISTANT_PREAMBLE.to_string()),
        (Role::User, format!("{} :{{feedback}}", instruction)),
    ])
}

/// Classifies customer feedback, then drafts a reply for that class.
pub struct FeedbackRouter {
    classify: LlmChain,
    branch: Branch,
}

impl FeedbackRouter {
    pub fn new(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        let chain = |instruction: &str| {
            LlmChain::new(feedback_template(instruction), llm.clone(), options.clone())
        };

        let classify = chain(
            "Classify the sentiment of this feedback as positive, negative, neutral, or escalate",
        );
        let escalate = chain("Generate a message to escalate this feedback to a human agent");
        let branch = Branch::new(escalate)
            .route_on(
                "positive",
                chain("Generate a thank you note for this positive feedback"),
            )
            .route_on(
                "negative",
                chain("Generate a response addressing this negative feedback"),
            )
            .route_on(
                "neutral",
                chain("Generate a request for more details for this neutral feedback"),
            );

        Self { classify, branch }
    }

    pub async fn invoke(&self, feedback: &str) -> Result<String, ChainError> {
        let vars = vars([("feedback", feedback)]);
        let classification = self.classify.invoke(&vars).await?;
        tracing::info!("Feedback classified as: {}", classification);
        self.branch.invoke(&classification, &vars).await
    }
}
