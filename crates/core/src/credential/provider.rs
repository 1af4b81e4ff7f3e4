//! Per-agent token cache
//!
//! Each agent owns a slot guarded by an async mutex. A caller that needs a
//! fetch holds the slot's lock for the duration of the fetch, so concurrent
//! callers for the same agent wait and then read the freshly stored token
//! instead of issuing their own request. Different agents never block each
//! other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use wecom_domain::{AccessToken, AgentKey, Result, TokenConfig};

use super::ports::TokenAuthority;
use crate::time::Clock;

type TokenSlot = Arc<Mutex<Option<AccessToken>>>;

/// Caches access tokens per agent and refreshes them on demand.
pub struct CredentialProvider {
    authority: Arc<dyn TokenAuthority>,
    clock: Arc<dyn Clock>,
    slots: DashMap<AgentKey, TokenSlot>,
    refresh_margin_secs: i64,
}

impl CredentialProvider {
    pub fn new(
        authority: Arc<dyn TokenAuthority>,
        clock: Arc<dyn Clock>,
        config: &TokenConfig,
    ) -> Self {
        Self {
            authority,
            clock,
            slots: DashMap::new(),
            refresh_margin_secs: config.refresh_margin_secs,
        }
    }

    /// Return a usable token for `agent`.
    ///
    /// A cached token is returned without any network call unless
    /// `force_refresh` is set or the token is within the refresh margin of
    /// its expiry. When a fetch is in flight for the same agent, the caller
    /// waits for it and reuses its result. A forced refresh always fetches
    /// and replaces the stored token.
    ///
    /// # Errors
    /// Propagates the authority's error; the cached value is left untouched
    /// on failure.
    #[instrument(skip(self), fields(agent = %agent))]
    pub async fn get_token(&self, agent: &AgentKey, force_refresh: bool) -> Result<AccessToken> {
        let slot = self.slot(agent);
        let mut guard = slot.lock().await;
        if !force_refresh {
            if let Some(token) = guard.as_ref() {
                if !token.is_expired(self.clock.now(), self.refresh_margin_secs) {
                    debug!("Using cached access token");
                    return Ok(token.clone());
                }
            }
        }

        let token = self.authority.fetch_token(agent).await?;
        info!(expires_at = %token.expires_at(), forced = force_refresh, "Access token refreshed");
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Cached token for `agent`, if any, without contacting the authority.
    pub async fn cached_token(&self, agent: &AgentKey) -> Option<AccessToken> {
        let slot = self.slots.get(agent).map(|entry| entry.value().clone())?;
        let token = slot.lock().await.clone();
        token
    }

    /// Drop the cached token for `agent`.
    pub async fn invalidate(&self, agent: &AgentKey) {
        if let Some(slot) = self.slots.get(agent).map(|entry| entry.value().clone()) {
            *slot.lock().await = None;
        }
    }

    /// Number of agents that have a token slot.
    pub fn agent_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, agent: &AgentKey) -> TokenSlot {
        self.slots.entry(agent.clone()).or_default().value().clone()
    }
}
