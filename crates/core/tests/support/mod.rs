//! Shared test helpers for `wecom-core` integration tests.
//!
//! Scripted transports, counting token authorities and an in-memory media
//! loader, so tests can assert exact call counts without a network.

#![allow(dead_code)]

pub mod authority;
pub mod loader;
pub mod transport;

use std::sync::Arc;

use wecom_core::{CredentialProvider, MockClock, RetryableInvoker, TokenAuthority, Transport};
use wecom_domain::{AgentKey, TokenConfig};

pub fn agent() -> AgentKey {
    AgentKey::new(1000002, "agent-secret")
}

/// Provider and invoker wired to the given collaborators.
pub fn invoker(
    authority: Arc<dyn TokenAuthority>,
    transport: Arc<dyn Transport>,
    clock: &MockClock,
) -> (Arc<CredentialProvider>, Arc<RetryableInvoker>) {
    let provider = Arc::new(CredentialProvider::new(
        authority,
        Arc::new(clock.clone()),
        &TokenConfig::default(),
    ));
    let invoker = Arc::new(RetryableInvoker::new(provider.clone(), transport));
    (provider, invoker)
}
