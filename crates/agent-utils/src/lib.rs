//! Shared utilities for fin-agent
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup, redaction of secrets before they reach a log line, and
//! helpers for reading configuration from the environment.

pub mod env;
pub mod logging;
pub mod redact;

pub use env::{env_value, is_placeholder};
pub use logging::{LogConfig, init_tracing};
pub use redact::{preview, redact};
