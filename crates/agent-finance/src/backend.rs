//! LLM backend construction

use crate::config::{FinanceConfig, LlmBackend};
use crate::error::{FinanceError, Result};
use agent_llm::{LLMProvider, OpenAICompatConfig, OpenAICompatProvider};
use std::sync::Arc;
use tracing::info;

/// Build the provider shared by all agents
///
/// Fails with a configuration error when Groq is selected without a key.
pub fn build_provider(config: &FinanceConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider_config = match config.backend {
        LlmBackend::Groq => {
            let key = config.groq_api_key.as_deref().ok_or_else(|| {
                FinanceError::Configuration(
                    "missing required configuration: GROQ_API_KEY".to_string(),
                )
            })?;
            let base = OpenAICompatConfig::groq(key);
            match config.groq_api_base.as_deref() {
                Some(api_base) => base.with_api_base(api_base),
                None => base,
            }
        }
        LlmBackend::Ollama => OpenAICompatConfig::ollama(&config.ollama_host),
    }
    .with_timeout(config.llm_timeout.as_secs());

    info!(
        backend = %config.backend,
        api_base = %provider_config.api_base,
        model = %config.model(),
        "LLM backend configured"
    );

    let provider = OpenAICompatProvider::with_config(provider_config)?;
    Ok(Arc::new(provider))
}
