//! Media ("material") descriptors
//!
//! A descriptor is created from local content, receives its remote media id
//! exactly once when an upload succeeds, and is immutable from then on.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, WeComError};
use crate::impl_wire_str_conversions;

/// Media categories accepted by `media/upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Voice,
    Video,
    File,
}

impl_wire_str_conversions!(MediaKind {
    Image => "image",
    Voice => "voice",
    Video => "video",
    File => "file",
});

impl MediaKind {
    /// Classify by MIME type; anything unrecognised is a plain file.
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.split('/').next() {
            Some("image") => Self::Image,
            Some("audio") => Self::Voice,
            Some("video") => Self::Video,
            _ => Self::File,
        }
    }
}

/// Guess a MIME type from a file name's extension.
pub fn guess_content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "amr" => "audio/amr",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Where a media payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// Bytes already in memory, with the name to upload them under.
    Bytes { file_name: String, content: Bytes },
}

impl MediaSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn bytes(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self::Bytes { file_name: file_name.into(), content: content.into() }
    }
}

/// Local media payload plus, once uploaded, its remote identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    media_id: Option<String>,
    kind: MediaKind,
    file_name: String,
    content_type: String,
    content: Bytes,
}

impl MediaDescriptor {
    /// Descriptor for local content; kind is derived from the content type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content_type = content_type.into();
        Self {
            media_id: None,
            kind: MediaKind::from_content_type(&content_type),
            file_name: file_name.into(),
            content_type,
            content: content.into(),
        }
    }

    /// Descriptor whose content type is guessed from the file name.
    pub fn from_file_name(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name);
        Self::new(file_name, content_type, content)
    }

    /// Override the media kind (e.g. upload an image as a plain file).
    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Descriptor for content fetched from the remote service.
    pub fn downloaded(
        media_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let mut descriptor = Self::new(file_name, content_type, content);
        descriptor.media_id = Some(media_id.into());
        descriptor
    }

    pub fn media_id(&self) -> Option<&str> {
        self.media_id.as_deref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.media_id.is_some()
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Record the remote identifier returned by a successful upload.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the descriptor already carries an id or the
    /// id is empty.
    pub fn attach_media_id(&mut self, media_id: impl Into<String>) -> Result<()> {
        let media_id = media_id.into();
        if media_id.is_empty() {
            return Err(WeComError::InvalidInput("media id must not be empty".into()));
        }
        if let Some(existing) = &self.media_id {
            return Err(WeComError::InvalidInput(format!(
                "media '{}' already uploaded as {existing}",
                self.file_name
            )));
        }
        self.media_id = Some(media_id);
        Ok(())
    }
}
