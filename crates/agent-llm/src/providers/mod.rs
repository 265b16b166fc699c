//! Concrete LLM provider implementations
//!
//! Groq and Ollama both speak the OpenAI chat-completions protocol, so a
//! single provider with per-backend presets covers them.

pub mod openai_compat;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};
