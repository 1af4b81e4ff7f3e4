//! Scripted transport

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use wecom_core::{ApiRequest, ApiResponse, Transport};
use wecom_domain::{Result, WeComError};

/// Replays queued responses in order and records every request.
///
/// Once the queue is drained, further calls fail with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, body: Value) -> Self {
        self.responses.lock().push_back(Ok(ApiResponse::json(body)));
        self
    }

    pub fn with_response(self, response: ApiResponse) -> Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    pub fn with_error(self, error: WeComError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Queue `{"errcode": code, "errmsg": ...}`.
    pub fn with_errcode(self, code: i64) -> Self {
        self.with_json(json!({"errcode": code, "errmsg": format!("error {code}")}))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// `access_token` query value of every recorded request.
    pub fn tokens_used(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.query_param("access_token").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(WeComError::Transport("no scripted response left".into())))
    }
}
