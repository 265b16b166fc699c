//! Core abstractions for fin-agent
//!
//! This crate defines the fundamental traits and types shared by the LLM,
//! runtime and finance crates.

pub mod agent;
pub mod error;
pub mod output;

pub use agent::Agent;
pub use error::{BackendFailureKind, Error, Result};
pub use output::{AgentOutput, ToolCallRecord};
