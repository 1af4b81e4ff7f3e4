//! [`Transport`] implementation over [`HttpClient`]

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};
use wecom_core::{
    ApiRequest, ApiResponse, BinaryBody, HttpMethod, MultipartFile, RequestBody, ResponsePayload,
    Transport,
};
use wecom_domain::constants::FIELD_ERRCODE;
use wecom_domain::{Result, WeComError};

use super::client::HttpClient;
use crate::errors::InfraError;

/// Sends [`ApiRequest`]s to the remote API under a base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: HttpClient,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        let response = self.client.send(|client| build_request(client, &url, &request)).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let content = response.bytes().await.map_err(|err| WeComError::from(InfraError::from(err)))?;
        debug!(status = status.as_u16(), bytes = content.len(), "response body received");

        let payload = decode_payload(&headers, content)?;
        if !status.is_success() {
            // Some gateways answer errors with a non-2xx status but a normal
            // errcode body; anything else is a transport failure.
            let carries_errcode = matches!(
                &payload,
                ResponsePayload::Json(body) if body.get(FIELD_ERRCODE).is_some()
            );
            if !carries_errcode {
                return Err(WeComError::Transport(format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown status")
                )));
            }
        }

        Ok(ApiResponse { status: status.as_u16(), payload })
    }
}

fn build_request(client: &ReqwestClient, url: &str, request: &ApiRequest) -> RequestBuilder {
    let builder = match request.method {
        HttpMethod::Get => client.get(url),
        HttpMethod::Post => client.post(url),
    };
    let builder = builder.query(&request.query);

    match &request.body {
        RequestBody::Empty => builder,
        RequestBody::Json(body) => builder.json(body),
        RequestBody::Multipart(file) => builder.multipart(multipart_form(file)),
    }
}

fn multipart_form(file: &MultipartFile) -> Form {
    let part = Part::bytes(file.content.to_vec()).file_name(file.file_name.clone());
    // An unparsable MIME type falls back to reqwest's octet-stream default.
    let part = match part.mime_str(&file.content_type) {
        Ok(part) => part,
        Err(_) => Part::bytes(file.content.to_vec()).file_name(file.file_name.clone()),
    };
    Form::new().part(file.part_name.clone(), part)
}

/// JSON bodies (including error bodies from download endpoints) are parsed;
/// everything else is treated as file content.
fn decode_payload(headers: &HeaderMap, content: Bytes) -> Result<ResponsePayload> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let looks_like_json = essence == "application/json"
        || essence == "text/json"
        || (essence == "text/plain" && content.first() == Some(&b'{'));

    if looks_like_json {
        let body: Value =
            serde_json::from_slice(&content).map_err(|err| WeComError::from(InfraError::from(err)))?;
        return Ok(ResponsePayload::Json(body));
    }

    let file_name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_disposition);

    Ok(ResponsePayload::Binary(BinaryBody {
        content_type: if essence.is_empty() { "application/octet-stream".into() } else { essence },
        file_name,
        content,
    }))
}

/// File name from a `Content-Disposition` header value.
///
/// `filename*=UTF-8''...` wins over a plain `filename="..."`.
pub(crate) fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let raw = raw.trim();
        if key == "filename*" {
            let encoded = raw.rsplit("''").next().unwrap_or(raw).trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        } else if key == "filename" {
            let name = raw.trim_matches('"');
            if !name.is_empty() {
                plain = Some(name.to_string());
            }
        }
    }
    plain
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn content_disposition_variants() {
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="report.pdf""#),
            Some("report.pdf".into())
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=plain.txt"),
            Some("plain.txt".into())
        );
        assert_eq!(
            parse_content_disposition(
                r#"attachment; filename="fallback.jpg"; filename*=UTF-8''%E5%9B%BE%E7%89%87.jpg"#
            ),
            Some("图片.jpg".into())
        );
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn json_content_type_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=UTF-8"));
        let payload =
            decode_payload(&headers, Bytes::from_static(br#"{"errcode":40007}"#)).unwrap();
        assert!(matches!(payload, ResponsePayload::Json(ref v) if v["errcode"] == 40007));
    }

    #[test]
    fn text_plain_json_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let payload = decode_payload(&headers, Bytes::from_static(br#"{"errcode":0}"#)).unwrap();
        assert!(matches!(payload, ResponsePayload::Json(_)));
    }

    #[test]
    fn other_content_is_binary() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        headers.insert(CONTENT_DISPOSITION, HeaderValue::from_static(r#"attachment; filename="a.jpg""#));
        let payload = decode_payload(&headers, Bytes::from_static(b"\xff\xd8")).unwrap();
        match payload {
            ResponsePayload::Binary(body) => {
                assert_eq!(body.content_type, "image/jpeg");
                assert_eq!(body.file_name.as_deref(), Some("a.jpg"));
            }
            other => panic!("expected binary payload, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_invalid_response() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = decode_payload(&headers, Bytes::from_static(b"{oops")).unwrap_err();
        assert!(matches!(err, WeComError::InvalidResponse(_)));
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let transport =
            HttpTransport::new(HttpClient::new().unwrap(), "https://qyapi.weixin.qq.com/cgi-bin/");
        assert_eq!(transport.url("/gettoken"), "https://qyapi.weixin.qq.com/cgi-bin/gettoken");
        assert_eq!(transport.url("media/get"), "https://qyapi.weixin.qq.com/cgi-bin/media/get");
    }
}
