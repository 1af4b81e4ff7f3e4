//! Client configuration structures
//!
//! Deserialized from TOML/JSON files or assembled from environment variables
//! by the infra config loader.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_HTTP_BASE_BACKOFF_MS, DEFAULT_HTTP_MAX_ATTEMPTS,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MEDIA_CACHE_MAX_CAPACITY,
    DEFAULT_TOKEN_REFRESH_MARGIN_SECS, MAX_MEDIA_CACHE_TTL_SECS, MAX_TOKEN_EXPIRES_IN_SECS,
    MEDIA_CACHE_TTL_SECS,
};
use crate::errors::{Result, WeComError};
use crate::types::AgentKey;

/// Top-level configuration for one organization ("corp").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeComConfig {
    pub corp_id: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub media_cache: MediaCacheConfig,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl WeComConfig {
    /// Configuration with defaults for everything but the corp id.
    pub fn new(corp_id: impl Into<String>) -> Self {
        Self {
            corp_id: corp_id.into(),
            api_base_url: default_api_base_url(),
            http: HttpConfig::default(),
            token: TokenConfig::default(),
            media_cache: MediaCacheConfig::default(),
            agents: Vec::new(),
        }
    }

    /// Check required fields and value ranges.
    ///
    /// # Errors
    /// Returns `WeComError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.corp_id.trim().is_empty() {
            return Err(WeComError::Config("corp_id must not be empty".into()));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(WeComError::Config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.http.max_attempts == 0 {
            return Err(WeComError::Config("http.max_attempts must be at least 1".into()));
        }
        if self.media_cache.ttl_secs == 0 || self.media_cache.ttl_secs > MAX_MEDIA_CACHE_TTL_SECS {
            return Err(WeComError::Config(format!(
                "media_cache.ttl_secs must be between 1 and {MAX_MEDIA_CACHE_TTL_SECS}, got {}",
                self.media_cache.ttl_secs
            )));
        }
        if !(0..=MAX_TOKEN_EXPIRES_IN_SECS).contains(&self.token.refresh_margin_secs) {
            return Err(WeComError::Config(format!(
                "token.refresh_margin_secs must be between 0 and {MAX_TOKEN_EXPIRES_IN_SECS}, got {}",
                self.token.refresh_margin_secs
            )));
        }
        for agent in &self.agents {
            if agent.secret.is_empty() {
                return Err(WeComError::Config(format!(
                    "agent '{}' has an empty secret",
                    agent.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a configured agent by name.
    pub fn agent(&self, name: &str) -> Option<AgentKey> {
        self.agents.iter().find(|a| a.name == name).map(AgentConfig::key)
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Attempts per request for connect errors and 5xx responses.
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_HTTP_BASE_BACKOFF_MS,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

/// Access token settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Treat tokens as expired this many seconds before `expires_in`.
    pub refresh_margin_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { refresh_margin_secs: DEFAULT_TOKEN_REFRESH_MARGIN_SECS }
    }
}

/// Media cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaCacheConfig {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for MediaCacheConfig {
    fn default() -> Self {
        Self { ttl_secs: MEDIA_CACHE_TTL_SECS, max_capacity: DEFAULT_MEDIA_CACHE_MAX_CAPACITY }
    }
}

impl MediaCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// A named agent and its credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub agent_id: i64,
    pub secret: String,
}

impl AgentConfig {
    pub fn key(&self) -> AgentKey {
        AgentKey::new(self.agent_id, self.secret.clone())
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("agent_id", &self.agent_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
