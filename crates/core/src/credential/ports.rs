//! Token authority port

use async_trait::async_trait;
use wecom_domain::{AccessToken, AgentKey, Result};

/// Issues access tokens for agent credentials.
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Exchange the agent's secret for a fresh token.
    ///
    /// # Errors
    /// `WeComError::Credential` when the authority rejects the credentials,
    /// `WeComError::Transport` when it cannot be reached.
    async fn fetch_token(&self, agent: &AgentKey) -> Result<AccessToken>;
}
