//! Agent identities and access tokens

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Application identity within an organization.
///
/// Tokens are scoped per agent: two keys are the same agent when both the
/// numeric id and the secret match.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentKey {
    agent_id: i64,
    secret: String,
}

impl AgentKey {
    pub fn new(agent_id: i64, secret: impl Into<String>) -> Self {
        Self { agent_id, secret: secret.into() }
    }

    /// Numeric `agentid` sent with every message.
    pub fn id(&self) -> i64 {
        self.agent_id
    }

    /// Secret exchanged for an access token.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentKey")
            .field("agent_id", &self.agent_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent:{}", self.agent_id)
    }
}

/// Bearer token issued by the token authority.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token issued at `issued_at` and valid for `expires_in_secs`.
    ///
    /// A lifetime past the representable range saturates at the latest
    /// instant.
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>, expires_in_secs: i64) -> Self {
        let expires_at = Duration::try_seconds(expires_in_secs.max(0))
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { token: token.into(), issued_at, expires_at }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once `now` is within `margin_secs` of the expiry instant.
    /// An out-of-range margin makes the token count as expired.
    pub fn is_expired(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        let refresh_at = Duration::try_seconds(margin_secs.max(0))
            .and_then(|margin| self.expires_at.checked_sub_signed(margin))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        now >= refresh_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.token.chars().take(6).collect();
        f.debug_struct("AccessToken")
            .field("token", &format!("{prefix}…"))
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
