//! Token authority backed by the remote `gettoken` endpoint

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use wecom_domain::constants::{
    DEFAULT_TOKEN_EXPIRES_IN_SECS, FIELD_ACCESS_TOKEN, FIELD_EXPIRES_IN,
    MAX_TOKEN_EXPIRES_IN_SECS, PATH_GET_TOKEN,
};
use wecom_domain::{AccessToken, AgentKey, Result, WeComError};

use super::ports::TokenAuthority;
use crate::time::Clock;
use crate::transport_ports::{ApiRequest, Transport};

/// Fetches tokens with `GET gettoken?corpid=..&corpsecret=..`.
pub struct RemoteTokenAuthority {
    transport: Arc<dyn Transport>,
    corp_id: String,
    clock: Arc<dyn Clock>,
}

impl RemoteTokenAuthority {
    pub fn new(
        transport: Arc<dyn Transport>,
        corp_id: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { transport, corp_id: corp_id.into(), clock }
    }

    pub fn corp_id(&self) -> &str {
        &self.corp_id
    }
}

#[async_trait]
impl TokenAuthority for RemoteTokenAuthority {
    #[instrument(skip(self), fields(agent = %agent))]
    async fn fetch_token(&self, agent: &AgentKey) -> Result<AccessToken> {
        let request = ApiRequest::get(PATH_GET_TOKEN)
            .with_query("corpid", self.corp_id.as_str())
            .with_query("corpsecret", agent.secret());

        let issued_at = self.clock.now();
        let response = self.transport.execute(request).await?;

        let code = response.errcode();
        if code != 0 {
            return Err(WeComError::credential(code, response.errmsg()));
        }

        let token = response.str_field(FIELD_ACCESS_TOKEN).ok_or_else(|| {
            WeComError::InvalidResponse("gettoken response has no access_token".into())
        })?;
        let expires_in =
            response.i64_field(FIELD_EXPIRES_IN).unwrap_or(DEFAULT_TOKEN_EXPIRES_IN_SECS);
        if !(0..=MAX_TOKEN_EXPIRES_IN_SECS).contains(&expires_in) {
            return Err(WeComError::InvalidResponse(format!(
                "gettoken expires_in out of range: {expires_in}"
            )));
        }

        debug!(expires_in, "Access token issued");
        Ok(AccessToken::new(token, issued_at, expires_in))
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::time::MockClock;
    use crate::transport_ports::ApiResponse;

    struct OneShotTransport {
        response: ApiResponse,
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl Transport for OneShotTransport {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().push(request);
            Ok(self.response.clone())
        }
    }

    fn authority(body: serde_json::Value) -> (RemoteTokenAuthority, Arc<OneShotTransport>) {
        let transport =
            Arc::new(OneShotTransport { response: ApiResponse::json(body), seen: Mutex::new(vec![]) });
        let authority =
            RemoteTokenAuthority::new(transport.clone(), "ww-corp", Arc::new(MockClock::new()));
        (authority, transport)
    }

    #[tokio::test]
    async fn sends_corp_id_and_secret() {
        let (authority, transport) =
            authority(json!({"errcode": 0, "access_token": "T1", "expires_in": 7200}));

        let token = authority.fetch_token(&AgentKey::new(1000002, "S1")).await.unwrap();
        assert_eq!(token.token(), "T1");
        assert_eq!(token.expires_at() - token.issued_at(), chrono::Duration::seconds(7200));

        let seen = transport.seen.lock();
        assert_eq!(seen[0].path, "gettoken");
        assert_eq!(seen[0].query_param("corpid"), Some("ww-corp"));
        assert_eq!(seen[0].query_param("corpsecret"), Some("S1"));
    }

    #[tokio::test]
    async fn rejected_secret_is_credential_error() {
        let (authority, _) = authority(json!({"errcode": 40001, "errmsg": "invalid credential"}));

        let err = authority.fetch_token(&AgentKey::new(1, "bad")).await.unwrap_err();
        assert_eq!(err, WeComError::credential(40001, "invalid credential"));
    }

    #[tokio::test]
    async fn missing_token_is_invalid_response() {
        let (authority, _) = authority(json!({"errcode": 0}));

        let err = authority.fetch_token(&AgentKey::new(1, "S")).await.unwrap_err();
        assert!(matches!(err, WeComError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_expires_in_uses_default_lifetime() {
        let (authority, _) = authority(json!({"access_token": "T"}));

        let token = authority.fetch_token(&AgentKey::new(1, "S")).await.unwrap();
        assert_eq!(token.expires_at() - token.issued_at(), chrono::Duration::seconds(7200));
    }

    #[tokio::test]
    async fn out_of_range_expires_in_is_invalid_response() {
        for expires_in in [i64::MAX, -1] {
            let (authority, _) =
                authority(json!({"errcode": 0, "access_token": "T", "expires_in": expires_in}));

            let err = authority.fetch_token(&AgentKey::new(1, "S")).await.unwrap_err();
            assert!(matches!(err, WeComError::InvalidResponse(msg) if msg.contains("expires_in")));
        }
    }
}
