//! Counting token authority

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use wecom_core::{Clock, MockClock, TokenAuthority};
use wecom_domain::{AccessToken, AgentKey, Result, WeComError};

/// Issues `token-1`, `token-2`, ... and counts every fetch.
pub struct CountingAuthority {
    clock: MockClock,
    fetches: AtomicUsize,
    delay: Option<Duration>,
    failure: Option<WeComError>,
    expires_in_secs: i64,
}

impl CountingAuthority {
    pub fn new(clock: &MockClock) -> Self {
        Self {
            clock: clock.clone(),
            fetches: AtomicUsize::new(0),
            delay: None,
            failure: None,
            expires_in_secs: 7200,
        }
    }

    /// Sleep (tokio time) inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every fetch with `error`.
    pub fn failing(mut self, error: WeComError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn with_expires_in(mut self, secs: i64) -> Self {
        self.expires_in_secs = secs;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenAuthority for CountingAuthority {
    async fn fetch_token(&self, _agent: &AgentKey) -> Result<AccessToken> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(AccessToken::new(format!("token-{n}"), self.clock.now(), self.expires_in_secs))
    }
}
