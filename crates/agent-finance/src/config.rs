//! Configuration for the financial query agents

use crate::error::{FinanceError, Result};
use agent_utils::is_placeholder;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Upper bound for `search_max_results` and per-call web search limits
pub const MAX_SEARCH_RESULTS: usize = 10;

/// LLM backend serving every agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LlmBackend {
    /// Groq cloud (requires `GROQ_API_KEY`)
    #[default]
    Groq,
    /// Local Ollama server
    Ollama,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => DEFAULT_GROQ_MODEL,
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackend {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "ollama" => Ok(Self::Ollama),
            other => Err(FinanceError::Configuration(format!(
                "unknown LLM backend '{other}' (expected groq or ollama)"
            ))),
        }
    }
}

/// Immutable configuration passed into dispatcher construction
///
/// Built once at startup from the environment (or the builder in tests);
/// nothing reads environment variables after that.
#[derive(Clone)]
pub struct FinanceConfig {
    pub backend: LlmBackend,
    pub groq_api_key: Option<String>,
    /// Override for the Groq endpoint (`GROQ_API_BASE`)
    pub groq_api_base: Option<String>,
    pub ollama_host: String,
    /// Explicit model id; `None` picks the backend default
    pub model: Option<String>,
    pub finnhub_api_key: Option<String>,
    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,
    pub tavily_api_key: Option<String>,
    pub llm_timeout: Duration,
    pub data_timeout: Duration,
    pub max_iterations: usize,
    pub max_tokens: usize,
    pub temperature: f32,
    pub search_max_results: usize,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Groq,
            groq_api_key: None,
            groq_api_base: None,
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            model: None,
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
            tavily_api_key: None,
            llm_timeout: Duration::from_secs(120),
            data_timeout: Duration::from_secs(30),
            max_iterations: 8,
            max_tokens: 4096,
            temperature: 0.2,
            search_max_results: 5,
        }
    }
}

impl fmt::Debug for FinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(key: Option<&String>) -> &'static str {
            if key.is_some() { "<set>" } else { "<unset>" }
        }

        f.debug_struct("FinanceConfig")
            .field("backend", &self.backend)
            .field("groq_api_key", &mask(self.groq_api_key.as_ref()))
            .field("groq_api_base", &self.groq_api_base)
            .field("ollama_host", &self.ollama_host)
            .field("model", &self.model())
            .field("finnhub_api_key", &mask(self.finnhub_api_key.as_ref()))
            .field("finnhub_rate_limit", &self.finnhub_rate_limit)
            .field("tavily_api_key", &mask(self.tavily_api_key.as_ref()))
            .field("llm_timeout", &self.llm_timeout)
            .field("data_timeout", &self.data_timeout)
            .field("max_iterations", &self.max_iterations)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("search_max_results", &self.search_max_results)
            .finish()
    }
}

impl FinanceConfig {
    /// Create a new configuration builder
    pub fn builder() -> FinanceConfigBuilder {
        FinanceConfigBuilder::default()
    }

    /// Read configuration from process environment variables
    ///
    /// Does not validate; call [`FinanceConfig::validate`] after applying
    /// any command-line overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(agent_utils::env_value)
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !is_placeholder(v));
        let defaults = Self::default();

        let backend = match get("LLM_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.backend,
        };

        Ok(Self {
            backend,
            groq_api_key: get("GROQ_API_KEY"),
            groq_api_base: get("GROQ_API_BASE"),
            ollama_host: get("OLLAMA_HOST").unwrap_or(defaults.ollama_host),
            model: get("LLM_MODEL"),
            finnhub_api_key: get("FINNHUB_API_KEY"),
            finnhub_rate_limit: parse_var("FINNHUB_RATE_LIMIT", get("FINNHUB_RATE_LIMIT"))?
                .unwrap_or(defaults.finnhub_rate_limit),
            tavily_api_key: get("TAVILY_API_KEY"),
            llm_timeout: parse_var("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"))?
                .map_or(defaults.llm_timeout, Duration::from_secs),
            ..defaults
        })
    }

    /// Override the backend
    pub fn with_backend(mut self, backend: LlmBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Override the model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Model id used for every completion
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Validate the configuration
    ///
    /// Missing credentials are reported together so a user fixes them in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.backend == LlmBackend::Groq && self.groq_api_key.is_none() {
            missing.push("GROQ_API_KEY");
        }
        if self.backend == LlmBackend::Ollama && self.ollama_host.trim().is_empty() {
            missing.push("OLLAMA_HOST");
        }
        if !missing.is_empty() {
            return Err(FinanceError::Configuration(format!(
                "missing required configuration: {} (set it in the environment or a .env file)",
                missing.join(", ")
            )));
        }

        if self.max_iterations == 0 {
            return Err(FinanceError::Configuration(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.finnhub_rate_limit == 0 {
            return Err(FinanceError::Configuration(
                "FINNHUB_RATE_LIMIT must be greater than 0".to_string(),
            ));
        }

        if self.search_max_results == 0 || self.search_max_results > MAX_SEARCH_RESULTS {
            return Err(FinanceError::Configuration(format!(
                "search_max_results must be between 1 and {MAX_SEARCH_RESULTS}"
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(FinanceError::Configuration(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.map(|value| {
        value.parse().map_err(|e: T::Err| {
            FinanceError::Configuration(format!("{name} has invalid value '{value}': {e}"))
        })
    })
    .transpose()
}

/// Builder for FinanceConfig
#[derive(Debug, Default)]
pub struct FinanceConfigBuilder {
    config: FinanceConfig,
}

impl FinanceConfigBuilder {
    pub fn backend(mut self, backend: LlmBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn groq_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.groq_api_key = Some(key.into());
        self
    }

    pub fn groq_api_base(mut self, base: impl Into<String>) -> Self {
        self.config.groq_api_base = Some(base.into());
        self
    }

    pub fn ollama_host(mut self, host: impl Into<String>) -> Self {
        self.config.ollama_host = host.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.finnhub_api_key = Some(key.into());
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.config.finnhub_rate_limit = per_minute;
        self
    }

    pub fn tavily_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.tavily_api_key = Some(key.into());
        self
    }

    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.config.llm_timeout = timeout;
        self
    }

    pub fn data_timeout(mut self, timeout: Duration) -> Self {
        self.config.data_timeout = timeout;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn max_tokens(mut self, max: usize) -> Self {
        self.config.max_tokens = max;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn search_max_results(mut self, max: usize) -> Self {
        self.config.search_max_results = max;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<FinanceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
