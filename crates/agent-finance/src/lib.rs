//! Financial query agents
//!
//! Routes natural-language financial questions to one of three pre-built
//! agents, each an LLM backend (Groq or Ollama) paired with a set of tools:
//!
//! - **financial**: stock price, analyst recommendations, fundamentals and company news
//! - **web**: web search with cited sources
//! - **multi**: both tool sets; the backend decides which to call
//!
//! # Example
//!
//! ```no_run
//! use agent_finance::{FinanceConfig, QueryDispatcher};
//!
//! # async fn example() -> agent_finance::Result<()> {
//! let config = FinanceConfig::from_env()?;
//! let dispatcher = QueryDispatcher::from_config(&config)?;
//!
//! let response = dispatcher
//!     .run("What is the current price of AAPL?", "financial")
//!     .await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod api;
pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod tools;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use agents::{AgentDefinition, AgentKind, AgentSettings};
pub use config::{FinanceConfig, FinanceConfigBuilder, LlmBackend};
pub use dispatcher::{AgentInfo, AgentResponse, QueryDispatcher, QueryDispatcherBuilder};
pub use error::{DataError, FinanceError, Result};
