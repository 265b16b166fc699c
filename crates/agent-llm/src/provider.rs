//! The backend seam

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend such as Groq or a local Ollama
///
/// One provider is shared by every agent and every concurrent run, so
/// `complete` takes `&self` and keeps no conversation state; the whole
/// history travels in each request.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Label used in logs and health output
    fn name(&self) -> &str;
}
