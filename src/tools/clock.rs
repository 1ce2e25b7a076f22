//! Clock read tool.

use async_trait::async_trait;

use super::{InputContract, Tool, ToolInput};
use crate::error::ToolError;

/// Returns the current local time as `HH:MM AM/PM`.
pub struct CurrentTime;

#[async_trait]
impl Tool for CurrentTime {
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
        let now = chrono::Local::now().format("%I:%M %p").to_string();
        tracing::info!("Current time: {}", now);
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn formats_twelve_hour_clock() {
        let out = CurrentTime.execute(ToolInput::None).await.unwrap();
        // e.g. "09:41 AM"
        assert_eq!(out.len(), 8);
        assert_eq!(&out[2..3], ":");
        assert!(out.ends_with("AM") || out.ends_with("PM"));
    }
}
