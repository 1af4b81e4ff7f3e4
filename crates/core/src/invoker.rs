//! Refresh-and-retry wrapper for authenticated remote calls
//!
//! Every authenticated call goes through [`RetryableInvoker`]. When the
//! service reports that the token is stale, the invoker forces exactly one
//! token refresh and repeats the call once. It never loops further.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use wecom_domain::constants::CREDENTIAL_EXPIRED_CODES;
use wecom_domain::{AccessToken, AgentKey, Result, WeComError};

use crate::credential::CredentialProvider;
use crate::transport_ports::{ApiRequest, ApiResponse, Transport};

/// Application attempts per call: the initial one plus one retry.
pub const MAX_ATTEMPTS: usize = 2;

/// Whether `code` means the access token is stale or invalid.
pub fn is_credential_expired(code: i64) -> bool {
    CREDENTIAL_EXPIRED_CODES.contains(&code)
}

/// Executes remote calls with a single refresh-and-retry on stale tokens.
pub struct RetryableInvoker {
    credentials: Arc<CredentialProvider>,
    transport: Arc<dyn Transport>,
}

impl RetryableInvoker {
    pub fn new(credentials: Arc<CredentialProvider>, transport: Arc<dyn Transport>) -> Self {
        Self { credentials, transport }
    }

    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    /// Run `call` with the agent's token, refreshing once if it is stale.
    ///
    /// The first attempt uses the cached token. If the response carries a
    /// credential-expired code, a forced refresh is performed and `call` runs
    /// one more time with the new token.
    ///
    /// # Errors
    /// - `WeComError::Remote` for any non-zero `errcode`, including a second
    ///   credential-expired code
    /// - Token and transport errors are propagated as-is
    pub async fn invoke<F, Fut>(&self, agent: &AgentKey, mut call: F) -> Result<ApiResponse>
    where
        F: FnMut(AccessToken) -> Fut + Send,
        Fut: Future<Output = Result<ApiResponse>> + Send,
    {
        let mut force_refresh = false;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let token = self.credentials.get_token(agent, force_refresh).await?;
            let response = call(token).await?;

            let code = response.errcode();
            if code == 0 {
                debug!(agent = %agent, attempt, "Remote call succeeded");
                return Ok(response);
            }

            if is_credential_expired(code) && attempt < MAX_ATTEMPTS {
                warn!(
                    agent = %agent,
                    errcode = code,
                    errmsg = response.errmsg(),
                    "Access token rejected, refreshing and retrying once"
                );
                force_refresh = true;
                continue;
            }

            return Err(WeComError::remote(code, response.errmsg()));
        }
    }

    /// Execute `request` through the transport with the agent's token
    /// attached as the `access_token` query parameter.
    pub async fn execute(&self, agent: &AgentKey, request: ApiRequest) -> Result<ApiResponse> {
        let transport = Arc::clone(&self.transport);
        self.invoke(agent, move |token| {
            let transport = Arc::clone(&transport);
            let request = request.clone().with_access_token(&token);
            async move { transport.execute(request).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_code_set_is_closed() {
        for code in [40014, 41001, 42001] {
            assert!(is_credential_expired(code), "{code} should be refreshable");
        }
        for code in [0, 40001, 40003, 45009, -1] {
            assert!(!is_credential_expired(code), "{code} should not be refreshable");
        }
    }
}
