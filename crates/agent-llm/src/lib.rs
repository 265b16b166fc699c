//! LLM backend abstraction for fin-agent
//!
//! Provider-neutral conversation types, tool descriptions and the
//! [`LLMProvider`] trait, plus one OpenAI-compatible implementation that
//! talks to both Groq and Ollama.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use providers::{OpenAICompatConfig, OpenAICompatProvider};
pub use tools::ToolDefinition;
