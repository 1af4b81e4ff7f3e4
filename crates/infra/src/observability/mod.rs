//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber filtered by `RUST_LOG`
//! (default `info`). Output is human-readable unless JSON is requested,
//! either explicitly or with `WECOM_LOG_FORMAT=json`.

use std::str::FromStr;

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;
use wecom_domain::{Result, WeComError};

/// Default filter when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Format from `WECOM_LOG_FORMAT`, falling back to pretty output.
    pub fn from_env() -> Self {
        std::env::var("WECOM_LOG_FORMAT").ok().and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = WeComError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" | "plain" => Ok(Self::Pretty),
            other => Err(WeComError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
/// Returns `WeComError::Config` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let result = match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().with_target(true).try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    result.map_err(|e| WeComError::Config(format!("failed to install tracing subscriber: {e}")))
}
