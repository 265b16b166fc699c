//! Agent runtime for fin-agent
//!
//! [`AgentExecutor`] runs the tool-calling loop against an LLM backend;
//! [`ToolAgent`] exposes an executor through the [`agent_core::Agent`] trait.

pub mod executor;
pub mod tool_agent;

pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use tool_agent::ToolAgent;
