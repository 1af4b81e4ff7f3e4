//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::CREDENTIAL_EXPIRED_CODES;

/// Main error type for the WeCom client
///
/// Remote failures keep the service's `errcode` and `errmsg` verbatim so
/// callers can diagnose them against the vendor documentation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WeComError {
    /// Network or connection failure below the application protocol.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The token authority rejected the agent credentials.
    #[error("Credential error {code}: {message}")]
    Credential { code: i64, message: String },

    /// The remote service answered with a non-zero `errcode`.
    #[error("Remote error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local media could not be loaded.
    #[error("Media error: {0}")]
    Media(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeComError {
    /// Build a remote error from a response's code and message.
    pub fn remote(code: i64, message: impl Into<String>) -> Self {
        Self::Remote { code, message: message.into() }
    }

    /// Build a credential error from the token authority's code and message.
    pub fn credential(code: i64, message: impl Into<String>) -> Self {
        Self::Credential { code, message: message.into() }
    }

    /// Remote `errcode` carried by this error, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Credential { code, .. } | Self::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is a remote error whose code means "token stale".
    ///
    /// Only produced after the single refresh cycle has been used up.
    pub fn is_credential_expired(&self) -> bool {
        matches!(self, Self::Remote { code, .. } if CREDENTIAL_EXPIRED_CODES.contains(code))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, WeComError>;
