//! Tool management and execution framework for fin-agent
//!
//! Tools are the only way an agent touches the outside world. Each tool
//! turns JSON arguments chosen by the model into text the model reads on
//! its next step; failures are text too, so the model can explain them.

pub mod output;
pub mod registry;
pub mod tool;

pub use output::{ToolError, ToolErrorKind, ToolOutput};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tool::Tool;
