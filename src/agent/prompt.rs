//! System prompt templates for the agent.

use crate::tools::{InputContract, ToolSpec};

/// Default session instructions, used as the conversation's System message.
///
/// Tool names are not repeated here; the system prompt lists the registry.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant that can provide helpful answers using available tools.\nIf you are unable to answer directly, use one of the tools listed below.";

/// Appended to the newest user-side message on every iteration.
pub const JSON_REMINDER: &str = "(reminder to respond in a JSON blob no matter what)";

/// Appended when the model has no tool iterations left.
pub const FINAL_STEP_NOTICE: &str =
    "You have no tool calls left. Respond now with the \"Final Answer\" action.";

fn describe_input(input: &InputContract) -> String {
    match input {
        InputContract::None => "no input".to_string(),
        InputContract::FreeText => "a single string".to_string(),
        InputContract::Structured(schema) => schema["properties"].to_string(),
    }
}

/// Build the structured-chat system prompt with tool definitions.
///
/// `instructions` is the session's own System message, if any.
pub fn build_system_prompt(instructions: Option<&str>, tools: &[ToolSpec]) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("{}: {}, input: {}", t.name, t.description, describe_input(&t.input)))
        .collect::<Vec<_>>()
        .join("\n");

    let tool_names = tools
        .iter()
        .map(|t| format!("\"{}\"", t.name))
        .collect::<Vec<_>>()
        .join(", ");

    let preamble = instructions.unwrap_or(
        "Respond to the human as helpfully and accurately as possible.",
    );

    format!(
        r#"{preamble}

You have access to the following tools:

{tool_descriptions}

Use a JSON blob to specify a tool by providing an "action" key (tool name) and an "action_input" key (tool input).

Valid "action" values: "Final Answer" or {tool_names}

Provide only ONE action per JSON blob, as shown:

```
{{
  "action": $TOOL_NAME,
  "action_input": $INPUT
}}
```

When you know the answer, or no tool is needed, respond with:

```
{{
  "action": "Final Answer",
  "action_input": "Final response to human"
}}
```

Begin! Reminder to ALWAYS respond with a valid JSON blob of a single action. Use tools if necessary. Respond directly if appropriate."#
    )
}
