//! Protocol constants
//!
//! Centralized location for endpoint paths, wire field names and the
//! defaults shared by configuration and services.

// Endpoints (relative to the API base URL)
pub const DEFAULT_API_BASE_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin";
pub const PATH_GET_TOKEN: &str = "gettoken";
pub const PATH_MEDIA_UPLOAD: &str = "media/upload";
pub const PATH_MEDIA_GET: &str = "media/get";
pub const PATH_MESSAGE_SEND: &str = "message/send";

// Wire field names
pub const FIELD_ACCESS_TOKEN: &str = "access_token";
pub const FIELD_EXPIRES_IN: &str = "expires_in";
pub const FIELD_MEDIA_ID: &str = "media_id";
pub const FIELD_ERRCODE: &str = "errcode";
pub const FIELD_ERRMSG: &str = "errmsg";
pub const FIELD_AGENT_ID: &str = "agentid";
pub const FIELD_MSG_TYPE: &str = "msgtype";
pub const FIELD_SAFE: &str = "safe";
pub const FIELD_TO_USER: &str = "touser";
pub const FIELD_TO_PARTY: &str = "toparty";
pub const FIELD_TO_TAG: &str = "totag";
pub const FIELD_INVALID_USER: &str = "invaliduser";
pub const FIELD_INVALID_PARTY: &str = "invalidparty";
pub const FIELD_INVALID_TAG: &str = "invalidtag";

/// Multipart part name expected by `media/upload`.
pub const MEDIA_UPLOAD_PART: &str = "media";

/// `touser` value addressing every member visible to the agent.
pub const BROADCAST_TARGET: &str = "@all";
pub const TARGET_SEPARATOR: char = '|';

/// Remote codes meaning the access token is stale or unusable:
/// 40014 invalid token, 41001 missing token, 42001 token expired.
pub const CREDENTIAL_EXPIRED_CODES: [i64; 3] = [40014, 41001, 42001];

// Token lifetime
pub const DEFAULT_TOKEN_EXPIRES_IN_SECS: i64 = 7200;
pub const DEFAULT_TOKEN_REFRESH_MARGIN_SECS: i64 = 300;
/// Longest `expires_in` accepted from the token authority.
pub const MAX_TOKEN_EXPIRES_IN_SECS: i64 = 7 * 24 * 60 * 60;

// Media cache: temporary media lives three days on the remote side
pub const MEDIA_CACHE_TTL_SECS: u64 = 3 * 24 * 60 * 60;
pub const MAX_MEDIA_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;
pub const DEFAULT_MEDIA_CACHE_MAX_CAPACITY: u64 = 10_000;

// HTTP transport
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_HTTP_BASE_BACKOFF_MS: u64 = 200;
