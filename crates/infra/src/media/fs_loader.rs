//! Filesystem-backed [`MediaLoader`]

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};
use wecom_core::MediaLoader;
use wecom_domain::{MediaDescriptor, MediaSource, Result, WeComError};

use crate::errors::InfraError;

/// Reads file sources with tokio's fs API; byte sources pass through.
///
/// Content type is guessed from the file extension and the media kind from
/// the content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMediaLoader;

impl FsMediaLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaLoader for FsMediaLoader {
    #[instrument(skip(self, source))]
    async fn load(&self, source: &MediaSource) -> Result<MediaDescriptor> {
        match source {
            MediaSource::Bytes { file_name, content } => {
                Ok(MediaDescriptor::from_file_name(file_name.clone(), content.clone()))
            }
            MediaSource::File(path) => {
                let file_name = file_name_of(path)?;
                let content =
                    tokio::fs::read(path).await.map_err(|e| WeComError::from(InfraError::from(e)))?;
                debug!(path = %path.display(), bytes = content.len(), "Media file loaded");
                Ok(MediaDescriptor::from_file_name(file_name, content))
            }
        }
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| WeComError::Media(format!("'{}' does not name a file", path.display())))
}
