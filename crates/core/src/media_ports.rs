//! Media loading port interfaces

use async_trait::async_trait;
use wecom_domain::{MediaDescriptor, MediaSource, Result};

/// Turns a [`MediaSource`] into a not-yet-uploaded [`MediaDescriptor`].
#[async_trait]
pub trait MediaLoader: Send + Sync {
    /// Load the payload and classify its media kind.
    async fn load(&self, source: &MediaSource) -> Result<MediaDescriptor>;
}
