//! Shared helpers for `wecom-infra` integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wecom_domain::{AgentConfig, AgentKey, WeComConfig};
use wecom_infra::WeComClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CORP_ID: &str = "ww-integration";
pub const AGENT_ID: i64 = 1000002;
pub const AGENT_SECRET: &str = "agent-secret";

/// Config pointing at the mock server, with fast retries.
pub fn config_for(server: &MockServer) -> WeComConfig {
    let mut config = WeComConfig::new(CORP_ID);
    config.api_base_url = format!("{}/cgi-bin", server.uri());
    config.http.timeout_secs = 5;
    config.http.max_attempts = 2;
    config.http.base_backoff_ms = 5;
    config.agents.push(AgentConfig {
        name: "app".into(),
        agent_id: AGENT_ID,
        secret: AGENT_SECRET.into(),
    });
    config
}

pub fn client_for(server: &MockServer) -> WeComClient {
    WeComClient::new(config_for(server)).expect("client should build")
}

pub fn agent() -> AgentKey {
    AgentKey::new(AGENT_ID, AGENT_SECRET)
}

/// Mount a `gettoken` endpoint issuing `token-1`, `token-2`, ...
///
/// Returns the fetch counter.
pub async fn mount_token_endpoint(server: &MockServer) -> Arc<AtomicUsize> {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = fetches.clone();
    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .and(query_param("corpid", CORP_ID))
        .and(query_param("corpsecret", AGENT_SECRET))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "access_token": format!("token-{n}"),
                "expires_in": 7200,
            }))
        })
        .mount(server)
        .await;
    fetches
}

pub fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn slow(template: ResponseTemplate, delay: Duration) -> ResponseTemplate {
    template.set_delay(delay)
}
