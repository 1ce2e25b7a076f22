//! Pure string tools: greeting, reversal and concatenation.

use async_trait::async_trait;

use super::{InputContract, Tool, ToolInput};
use crate::error::ToolError;

fn text_arg<'a>(tool: &str, input: &'a ToolInput) -> Result<&'a str, ToolError> {
    input
        .as_text()
        .ok_or_else(|| ToolError::invalid_input(tool, "expected a text argument"))
}

/// Greets the user by name.
pub struct GreetUser;

#[async_trait]
impl Tool for GreetUser {
    fn name(&self) -> &str {
        "GreetUser"
    }

    fn description(&self) -> &str {
        "Greets the user by name. Input should be a name."
    }

    fn input_contract(&self) -> InputContract {
        InputContract::FreeText
    }

    async fn execute(&self, input: ToolInput) -> Result<String, ToolError> {
        let name = text_arg(self.name(), &input)?;
        Ok(format!("Hello, {}!", name.trim()))
    }
}

/// Reverses a string character by character.
pub struct ReverseString;

#[async_trait]
impl Tool for ReverseString {
    fn name(&self) -> &str {
        "ReverseString"
    }

    fn description(&self) -> &str {
        "Reverses the given string. Input should be a string to reverse."
    }

    fn input_contract(&self) -> InputContract {
        InputContract::FreeText
    }

    async fn execute(&self, input: ToolInput) -> Result<String, ToolError> {
        let text = text_arg(self.name(), &input)?;
        Ok(text.chars().rev().collect())
    }
}

/// Joins two comma-separated strings.
pub struct ConcatenateStrings;

#[async_trait]
impl Tool for ConcatenateStrings {
    fn name(&self) -> &str {
        "ConcatenateStrings"
    }

    fn description(&self) -> &str {
        "Concatenates two strings together. Input should be two strings separated by a comma, like 'hello,world'."
    }

    fn input_contract(&self) -> InputContract {
        InputContract::FreeText
    }

    async fn execute(&self, input: ToolInput) -> Result<String, ToolError> {
        let text = text_arg(self.name(), &input)?;
        let (a, b) = text.split_once(',').ok_or_else(|| {
            ToolError::invalid_input(
                self.name(),
                "please provide two strings separated by a comma",
            )
        })?;
        Ok(format!("{}{}", a.trim(), b.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ToolInput {
        ToolInput::Text(s.to_string())
    }

    #[tokio::test]
    async fn greets_by_name() {
        assert_eq!(GreetUser.execute(text("Alice")).await.unwrap(), "Hello, Alice!");
    }

    #[tokio::test]
    async fn reverses_unicode_by_char() {
        assert_eq!(ReverseString.execute(text("hello")).await.unwrap(), "olleh");
        assert_eq!(ReverseString.execute(text("añb")).await.unwrap(), "bña");
    }

    #[tokio::test]
    async fn concatenates_on_first_comma() {
        let out = ConcatenateStrings
            .execute(text(" hello , world,again"))
            .await
            .unwrap();
        assert_eq!(out, "helloworld,again");
    }

    #[tokio::test]
    async fn concatenate_without_comma_is_invalid_input() {
        let err = ConcatenateStrings
            .execute(text("helloworld"))
            .await
            .expect_err("no comma");
        assert!(matches!(err, ToolError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn text_tools_reject_structured_input() {
        let err = GreetUser.execute(ToolInput::None).await.expect_err("no text");
        assert!(err.to_string().contains("GreetUser"));
    }
}
