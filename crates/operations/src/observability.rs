//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level when set.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::ConfigError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON lines for machine parsing.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = std::convert::Infallible;

    /// Case-insensitive. Unknown values fall back to Json.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "pretty" | "text" | "human" => Self::Pretty,
            _ => Self::Json,
        })
    }
}

/// Normalise a configured level into an `EnvFilter` directive.
pub fn parse_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => "info",
    }
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(parse_level(log_level)))
}

/// Install a human-readable global subscriber.
///
/// Panics if a global subscriber is already set; use
/// [`init_tracing_from_config`] where that can happen.
pub fn init_tracing(log_level: &str) {
    fmt().with_env_filter(env_filter(log_level)).init();
}

/// Install a global subscriber described by `config`.
pub fn init_tracing_from_config(config: &ObservabilityConfig) -> Result<(), ConfigError> {
    let filter = env_filter(&config.log_level);
    let format: LogFormat = config.log_format.parse().unwrap_or_default();
    let result = match format {
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };
    result.map_err(|e| ConfigError::TracingInit(e.to_string()))
}
