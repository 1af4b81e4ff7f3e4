//! Transport port interfaces
//!
//! The core describes remote calls as [`ApiRequest`] values and reads back
//! [`ApiResponse`] values; the infra crate provides the HTTP implementation.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use wecom_domain::constants::{FIELD_ACCESS_TOKEN, FIELD_ERRCODE, FIELD_ERRMSG};
use wecom_domain::{AccessToken, Result};

/// HTTP verbs used by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A file part for `multipart/form-data` uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    pub part_name: String,
    pub file_name: String,
    pub content_type: String,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartFile),
}

/// One remote call, relative to the configured API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Get, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self { method: HttpMethod::Post, path: path.into(), query: Vec::new(), body: RequestBody::Json(body) }
    }

    pub fn post_multipart(path: impl Into<String>, file: MultipartFile) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Multipart(file),
        }
    }

    /// Set a query parameter, replacing any previous value for `key`.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.query.retain(|(k, _)| *k != key);
        self.query.push((key, value.into()));
        self
    }

    /// Attach (or replace) the `access_token` query parameter.
    pub fn with_access_token(self, token: &AccessToken) -> Self {
        self.with_query(FIELD_ACCESS_TOKEN, token.token())
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Raw bytes returned by a download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    pub content_type: String,
    /// File name from `Content-Disposition`, when the server sent one.
    pub file_name: Option<String>,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Json(Value),
    Binary(BinaryBody),
}

/// Response of one remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub payload: ResponsePayload,
}

impl ApiResponse {
    pub fn json(body: Value) -> Self {
        Self { status: 200, payload: ResponsePayload::Json(body) }
    }

    pub fn binary(body: BinaryBody) -> Self {
        Self { status: 200, payload: ResponsePayload::Binary(body) }
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Json(value) => Some(value),
            ResponsePayload::Binary(_) => None,
        }
    }

    /// Application error code; binary payloads and bodies without
    /// `errcode` count as success.
    pub fn errcode(&self) -> i64 {
        self.json_body().and_then(|v| v.get(FIELD_ERRCODE)).and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn errmsg(&self) -> &str {
        self.str_field(FIELD_ERRMSG).unwrap_or_default()
    }

    /// String field of a JSON body; empty strings count as absent.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.json_body()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.json_body().and_then(|v| v.get(name)).and_then(Value::as_i64)
    }
}

/// Executes one remote call.
///
/// Implementations may retry connection failures internally; they must not
/// interpret application error codes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}
