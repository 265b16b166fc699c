//! Conversation messages
//!
//! Conversations are a list of role-tagged messages. Assistant messages may
//! carry tool-use blocks and user messages carry the matching tool results,
//! which providers translate into their own wire format. The system prompt
//! travels on [`CompletionRequest`](crate::CompletionRequest), not here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One piece of a structured message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },

    /// The model asks for a tool to be run
    ToolUse {
        /// Backend-assigned call id, echoed back in the result
        id: String,
        name: String,
        input: Value,
    },

    /// Rendered tool output fed back to the model
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    /// `None` for an assistant turn that produced nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    /// User turn carrying the output of one tool call
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error,
            }])),
        }
    }

    fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }

    /// Text of the message; multiple text blocks are joined with newlines
    pub fn text(&self) -> Option<String> {
        if let Some(MessageContent::Text(text)) = &self.content {
            return Some(text.clone());
        }

        let parts: Vec<&str> = self
            .blocks()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n"))
    }

    /// Tool-use blocks, in the order the model emitted them
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.blocks()
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
            .collect()
    }

    pub fn has_tool_uses(&self) -> bool {
        self.blocks()
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }

    /// Tool results carried by this message, as `(tool_use_id, content, is_error)`
    pub fn tool_results(&self) -> Vec<(&str, &str, bool)> {
        self.blocks()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => Some((tool_use_id.as_str(), content.as_str(), *is_error)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_messages() {
        let msg = Message::user("What is the current price of AAPL?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text().as_deref(), Some("What is the current price of AAPL?"));

        let empty = Message {
            role: Role::Assistant,
            content: None,
        };
        assert!(empty.text().is_none());
        assert!(!empty.has_tool_uses());
    }

    #[test]
    fn test_tool_results() {
        let ok = Message::tool_result("call_1", "AAPL last price: 272.41", false);
        assert_eq!(ok.role, Role::User);
        assert_eq!(ok.tool_results(), vec![("call_1", "AAPL last price: 272.41", false)]);

        let failed = Message::tool_result("call_2", "Error (not found: ZZZZ)", true);
        assert_eq!(failed.tool_results()[0].2, true);
    }

    #[test]
    fn test_text_joins_blocks_and_skips_tool_uses() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::Text {
                text: "first".to_string(),
            },
            ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "web_search".to_string(),
                input: json!({"query": "rust"}),
            },
            ContentBlock::Text {
                text: "second".to_string(),
            },
        ]);
        assert_eq!(msg.text().as_deref(), Some("first\nsecond"));
        assert_eq!(msg.tool_uses().len(), 1);
        assert!(msg.has_tool_uses());
    }

    #[test]
    fn test_error_flag_omitted_when_false() {
        let msg = Message::tool_result("call_1", "ok", false);
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value["content"][0].get("is_error").is_none());

        let back: Message = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }
}
