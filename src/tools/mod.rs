//! Tool registry and the tools the agent may call.
//!
//! Each tool declares an [`InputContract`]; raw input requested by the
//! reasoning service is validated against it before the handler runs.

mod clock;
mod text;
mod wikipedia;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DuplicateNameError, ToolError};

pub use clock::CurrentTime;
pub use text::{ConcatenateStrings, GreetUser, ReverseString};
pub use wikipedia::{Wikipedia, DEFAULT_WIKIPEDIA_URL};

/// What a tool accepts as input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "schema", rename_all = "snake_case")]
pub enum InputContract {
    /// No argument. Whatever the model supplies is ignored.
    None,
    /// A single free-text argument.
    FreeText,
    /// A JSON object described by a JSON schema.
    Structured(Value),
}

/// Input after it passed contract validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    None,
    Text(String),
    Structured(Map<String, Value>),
}

impl ToolInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// String field of a structured input.
    pub fn field(&self, key: &str) -> Option<&str> {
        match self {
            Self::Structured(map) => map.get(key).and_then(Value::as_str),
            _ => None,
        }
    }
}

impl InputContract {
    /// Check `raw` against the contract for tool `tool`.
    pub fn validate(&self, tool: &str, raw: &Value) -> Result<ToolInput, ToolError> {
        match self {
            Self::None => Ok(ToolInput::None),
            Self::FreeText => free_text(raw)
                .map(ToolInput::Text)
                .ok_or_else(|| ToolError::invalid_input(tool, "expected a text argument")),
            Self::Structured(schema) => structured(tool, schema, raw).map(ToolInput::Structured),
        }
    }
}

fn free_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // Models often wrap a single argument as {"input": "..."}.
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(free_text),
        _ => None,
    }
}

fn structured(tool: &str, schema: &Value, raw: &Value) -> Result<Map<String, Value>, ToolError> {
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let map = match raw {
        Value::Object(map) => map.clone(),
        // A bare string fills a schema with a single required field.
        Value::String(text) if required.len() == 1 => {
            let mut map = Map::new();
            map.insert(required[0].to_string(), Value::String(text.clone()));
            map
        }
        _ => return Err(ToolError::invalid_input(tool, "expected a JSON object")),
    };

    for key in &required {
        let Some(value) = map.get(*key) else {
            return Err(ToolError::invalid_input(
                tool,
                format!("missing required field '{key}'"),
            ));
        };
        let expected = schema["properties"][*key]["type"].as_str();
        if expected == Some("string") && !value.is_string() {
            return Err(ToolError::invalid_input(
                tool,
                format!("field '{key}' must be a string"),
            ));
        }
    }

    Ok(map)
}

/// A capability the reasoning service can ask the agent to invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Dispatch key. Case-sensitive and unique within a registry.
    fn name(&self) -> &str;

    /// Advisory text shown to the model.
    fn description(&self) -> &str;

    fn input_contract(&self) -> InputContract;

    async fn execute(&self, input: ToolInput) -> Result<String, ToolError>;
}

/// The model-facing description of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input: InputContract,
}

impl ToolSpec {
    fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input: tool.input_contract(),
        }
    }
}

/// Registry of available tools, in registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool.
    pub fn with_defaults(wikipedia: Wikipedia) -> Result<Self, DuplicateNameError> {
        let mut registry = Self::new();
        registry.register(Arc::new(CurrentTime))?;
        registry.register(Arc::new(wikipedia))?;
        registry.register(Arc::new(GreetUser))?;
        registry.register(Arc::new(ReverseString))?;
        registry.register(Arc::new(ConcatenateStrings))?;
        Ok(registry)
    }

    /// Add a tool. A duplicate name leaves the registry unchanged.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), DuplicateNameError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(DuplicateNameError(name));
        }
        tracing::debug!(tool = %name, "Registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    pub fn list(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| ToolSpec::of(t.as_ref())).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
