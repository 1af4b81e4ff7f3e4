//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;
use wecom_domain::WeComError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub WeComError);

impl From<InfraError> for WeComError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<WeComError> for InfraError {
    fn from(value: WeComError) -> Self {
        InfraError(value)
    }
}

trait IntoWeComError {
    fn into_wecom(self) -> WeComError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → WeComError */
/* -------------------------------------------------------------------------- */

impl IntoWeComError for HttpError {
    fn into_wecom(self) -> WeComError {
        if self.is_timeout() {
            return WeComError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return WeComError::Transport("HTTP connection failure".into());
        }

        if self.is_builder() {
            return WeComError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return WeComError::InvalidResponse(format!("failed to decode HTTP body: {self}"));
        }

        if let Some(status) = self.status() {
            return WeComError::Transport(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        WeComError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_wecom())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → WeComError */
/* -------------------------------------------------------------------------- */

impl IntoWeComError for IoError {
    fn into_wecom(self) -> WeComError {
        match self.kind() {
            ErrorKind::NotFound => WeComError::Media(format!("media file not found: {self}")),
            ErrorKind::PermissionDenied => {
                WeComError::Media(format!("permission denied reading media: {self}"))
            }
            _ => WeComError::Media(format!("failed to read media: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_wecom())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → WeComError */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(WeComError::InvalidResponse(format!("invalid JSON body: {value}")))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(WeComError::Config(format!("Invalid TOML format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
