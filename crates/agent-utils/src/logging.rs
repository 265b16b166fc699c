//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How the process-wide subscriber is set up
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Write to stderr so stdout stays clean for command output
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json: false,
            stderr: false,
        }
    }
}

impl LogConfig {
    /// Config for command-line tools: stderr, quiet unless verbose
    pub fn cli(verbose: bool) -> Self {
        Self {
            default_filter: if verbose { "info" } else { "warn" }.to_string(),
            json: false,
            stderr: true,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` overrides `default_filter`. Calling this twice is a no-op.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let layer = match (config.json, config.stderr) {
        (false, false) => fmt::layer().boxed(),
        (false, true) => fmt::layer().with_writer(std::io::stderr).boxed(),
        (true, false) => fmt::layer().json().boxed(),
        (true, true) => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let quiet = LogConfig::cli(false);
        assert_eq!(quiet.default_filter, "warn");
        assert!(quiet.stderr);

        let verbose = LogConfig::cli(true);
        assert_eq!(verbose.default_filter, "info");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing(&LogConfig::cli(false));
        init_tracing(&LogConfig::default());
    }
}
