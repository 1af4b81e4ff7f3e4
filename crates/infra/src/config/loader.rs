//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `WECOM_CORP_ID` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `WECOM_CORP_ID`: Organization id (required)
//! - `WECOM_API_BASE_URL`: API root, defaults to the public endpoint
//! - `WECOM_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `WECOM_HTTP_MAX_ATTEMPTS`: Attempts for connect errors and 5xx
//! - `WECOM_AGENT_ID` / `WECOM_AGENT_SECRET`: Registers one agent named
//!   `default` when both are set
//! - `WECOM_MEDIA_CACHE_TTL_SECS`: Media cache TTL in seconds
//!
//! ## File Locations
//! The loader probes `wecom.{toml,json}` then `config.{toml,json}` in the
//! working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use wecom_domain::{AgentConfig, Result, WeComConfig, WeComError};

use crate::errors::InfraError;

/// Name given to the agent registered from `WECOM_AGENT_ID`.
pub const ENV_AGENT_NAME: &str = "default";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `WeComError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<WeComConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `WECOM_CORP_ID` is required; everything else falls back to the
/// defaults of [`WeComConfig::new`].
///
/// # Errors
/// Returns `WeComError::Config` if the corp id is missing or a numeric
/// variable cannot be parsed.
pub fn load_from_env() -> Result<WeComConfig> {
    let mut config = WeComConfig::new(env_var("WECOM_CORP_ID")?);

    if let Some(url) = optional_env("WECOM_API_BASE_URL") {
        config.api_base_url = url;
    }
    if let Some(timeout) = env_parse::<u64>("WECOM_HTTP_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("WECOM_HTTP_MAX_ATTEMPTS")? {
        config.http.max_attempts = attempts;
    }
    if let Some(ttl) = env_parse::<u64>("WECOM_MEDIA_CACHE_TTL_SECS")? {
        config.media_cache.ttl_secs = ttl;
    }

    if let (Some(agent_id), Some(secret)) =
        (env_parse::<i64>("WECOM_AGENT_ID")?, optional_env("WECOM_AGENT_SECRET"))
    {
        config.agents.push(AgentConfig { name: ENV_AGENT_NAME.to_string(), agent_id, secret });
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`].
///
/// # Errors
/// Returns `WeComError::Config` if the file is missing, unreadable, not
/// valid JSON/TOML, or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<WeComConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(WeComError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            WeComError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| WeComError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<WeComConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| WeComError::from(InfraError::from(e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WeComError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(WeComError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["wecom.toml", "wecom.json", "config.toml", "config.json"];

    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter().flat_map(|dir| NAMES.iter().map(move |name| dir.join(name))).find(|p| p.exists())
}

fn env_var(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| WeComError::Config(format!("Missing required environment variable: {key}")))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| raw.parse::<T>().map_err(|e| WeComError::Config(format!("Invalid {key}: {e}"))))
        .transpose()
}
