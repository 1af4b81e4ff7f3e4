//! Credential provider caching and coalescing tests

mod support;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use support::authority::CountingAuthority;
use wecom_core::{CredentialProvider, MockClock};
use wecom_domain::{AgentKey, TokenConfig, WeComError};

fn provider(authority: &Arc<CountingAuthority>, clock: &MockClock) -> Arc<CredentialProvider> {
    Arc::new(CredentialProvider::new(
        authority.clone(),
        Arc::new(clock.clone()),
        &TokenConfig::default(),
    ))
}

#[tokio::test]
async fn cached_token_is_reused_without_fetch() {
    let clock = MockClock::new();
    let authority = Arc::new(CountingAuthority::new(&clock));
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    let first = provider.get_token(&agent, false).await.unwrap();
    let second = provider.get_token(&agent, false).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(authority.fetches(), 1);
    assert_eq!(provider.cached_token(&agent).await, Some(first));
}

#[tokio::test]
async fn forced_refresh_always_fetches_and_replaces() {
    let clock = MockClock::new();
    let authority = Arc::new(CountingAuthority::new(&clock));
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    let first = provider.get_token(&agent, false).await.unwrap();
    let forced = provider.get_token(&agent, true).await.unwrap();
    let after = provider.get_token(&agent, false).await.unwrap();

    assert_eq!(first.token(), "token-1");
    assert_eq!(forced.token(), "token-2");
    assert_eq!(after, forced);
    assert_eq!(authority.fetches(), 2);
}

#[tokio::test]
async fn oversized_refresh_margin_refetches_instead_of_panicking() {
    let clock = MockClock::new();
    let authority = Arc::new(CountingAuthority::new(&clock));
    let provider = CredentialProvider::new(
        authority.clone(),
        Arc::new(clock.clone()),
        &TokenConfig { refresh_margin_secs: i64::MAX },
    );
    let agent = support::agent();

    provider.get_token(&agent, false).await.unwrap();
    let second = provider.get_token(&agent, false).await.unwrap();

    assert_eq!(second.token(), "token-2");
    assert_eq!(authority.fetches(), 2);
}

#[tokio::test]
async fn token_near_expiry_is_refetched() {
    let clock = MockClock::new();
    let authority = Arc::new(CountingAuthority::new(&clock));
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    provider.get_token(&agent, false).await.unwrap();
    clock.advance(Duration::from_secs(7200 - 301));
    provider.get_token(&agent, false).await.unwrap();
    assert_eq!(authority.fetches(), 1);

    clock.advance(Duration::from_secs(1));
    let refreshed = provider.get_token(&agent, false).await.unwrap();
    assert_eq!(refreshed.token(), "token-2");
    assert_eq!(authority.fetches(), 2);
}

#[tokio::test]
async fn agents_have_separate_slots() {
    let clock = MockClock::new();
    let authority = Arc::new(CountingAuthority::new(&clock));
    let provider = provider(&authority, &clock);

    let a = provider.get_token(&AgentKey::new(1, "s1"), false).await.unwrap();
    let b = provider.get_token(&AgentKey::new(2, "s2"), false).await.unwrap();

    assert_ne!(a.token(), b.token());
    assert_eq!(authority.fetches(), 2);
    assert_eq!(provider.agent_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_fetch() {
    let clock = MockClock::new();
    let authority =
        Arc::new(CountingAuthority::new(&clock).with_delay(Duration::from_millis(50)));
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    let calls = (0..16).map(|_| {
        let provider = provider.clone();
        let agent = agent.clone();
        tokio::spawn(async move { provider.get_token(&agent, false).await })
    });
    let tokens: Vec<_> = join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(authority.fetches(), 1);
    assert!(tokens.iter().all(|t| t.token() == "token-1"));
}

#[tokio::test]
async fn failed_fetch_leaves_cache_empty() {
    let clock = MockClock::new();
    let authority = Arc::new(
        CountingAuthority::new(&clock).failing(WeComError::credential(40001, "invalid secret")),
    );
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    let err = provider.get_token(&agent, false).await.unwrap_err();
    assert_eq!(err, WeComError::credential(40001, "invalid secret"));
    assert_eq!(provider.cached_token(&agent).await, None);
}

#[tokio::test]
async fn invalidate_forces_next_fetch() {
    let clock = MockClock::new();
    let authority = Arc::new(CountingAuthority::new(&clock));
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    provider.get_token(&agent, false).await.unwrap();
    provider.invalidate(&agent).await;
    assert_eq!(provider.cached_token(&agent).await, None);

    provider.get_token(&agent, false).await.unwrap();
    assert_eq!(authority.fetches(), 2);
}

#[tokio::test]
async fn cancelled_fetch_stores_nothing() {
    let clock = MockClock::new();
    let authority =
        Arc::new(CountingAuthority::new(&clock).with_delay(Duration::from_millis(200)));
    let provider = provider(&authority, &clock);
    let agent = support::agent();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(10), provider.get_token(&agent, false)).await;
    assert!(timed_out.is_err());
    assert_eq!(provider.cached_token(&agent).await, None);

    let token = provider.get_token(&agent, false).await.unwrap();
    assert_eq!(token.token(), "token-2");
}
