//! One backend round trip: what is sent and what comes back

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Generation limit used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// Conversation so far plus the tools the model may call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,

    /// Sent ahead of `messages` as a system turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub messages: Vec<Message>,

    pub max_tokens: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Empty means the model answers in plain text only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tools: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// `None` leaves sampling to the backend's default
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// The model's reply to a [`CompletionRequest`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Why generation ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its answer
    #[default]
    EndTurn,
    /// Cut off at `max_tokens`
    MaxTokens,
    /// The model wants tool results before continuing
    ToolUse,
}

/// Token counts as reported by the backend; zero when it reports none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request = CompletionRequest::new("llama3.1", vec![Message::user("AAPL price?")]);

        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.system.is_none());
        assert!(request.temperature.is_none());
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_request_setters() {
        let request = CompletionRequest::new(
            "llama-3.3-70b-versatile",
            vec![Message::user("What is the current price of AAPL?")],
        )
        .with_system("You are the Financial Agent.")
        .with_max_tokens(2048)
        .with_temperature(Some(0.2))
        .with_tools(vec![ToolDefinition::new(
            "get_current_stock_price",
            "Latest price",
            json!({"type": "object"}),
        )]);

        assert_eq!(request.system.as_deref(), Some("You are the Financial Agent."));
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.tools.len(), 1);
    }

    #[test]
    fn test_empty_fields_are_not_serialized() {
        let request = CompletionRequest::new("llama3.1", Vec::new());
        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("system").is_none());
        assert!(value.get("tools").is_none());
        assert_eq!(value["max_tokens"], 4096);
    }
}
