//! Media cache with a fixed TTL
//!
//! Entries are keyed by the *remote* media id and stamped with an absolute
//! expiry taken from the injected [`Clock`]. Lookups treat expired entries
//! as absent and drop them. moka's own `time_to_live` bounds memory for
//! entries that are never looked up again.
//!
//! Two racing `get_or_create` calls for the same uncached media may both
//! upload; the later insert wins and both descriptors remain valid remotely.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use moka::sync::Cache;
use tracing::{debug, info, instrument};
use wecom_domain::constants::{
    FIELD_MEDIA_ID, MAX_MEDIA_CACHE_TTL_SECS, MEDIA_UPLOAD_PART, PATH_MEDIA_GET,
    PATH_MEDIA_UPLOAD,
};
use wecom_domain::{AgentKey, MediaCacheConfig, MediaDescriptor, MediaSource, Result, WeComError};

use crate::invoker::RetryableInvoker;
use crate::media_ports::MediaLoader;
use crate::time::Clock;
use crate::transport_ports::{ApiRequest, MultipartFile, ResponsePayload};

#[derive(Debug, Clone)]
struct CachedMedia {
    descriptor: MediaDescriptor,
    expires_at: DateTime<Utc>,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaCacheStats {
    pub entry_count: u64,
    pub ttl_secs: u64,
}

/// Time-bounded cache of uploaded media.
pub struct MediaCache {
    invoker: Arc<RetryableInvoker>,
    loader: Arc<dyn MediaLoader>,
    clock: Arc<dyn Clock>,
    entries: Cache<String, CachedMedia>,
    ttl: ChronoDuration,
    ttl_secs: u64,
}

impl MediaCache {
    pub fn new(
        invoker: Arc<RetryableInvoker>,
        loader: Arc<dyn MediaLoader>,
        clock: Arc<dyn Clock>,
        config: &MediaCacheConfig,
    ) -> Self {
        // Unvalidated configs are clamped to the longest accepted TTL.
        let ttl_secs = config.ttl_secs.min(MAX_MEDIA_CACHE_TTL_SECS);
        let entries = Cache::builder()
            .time_to_live(StdDuration::from_secs(ttl_secs))
            .max_capacity(config.max_capacity)
            .build();
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .unwrap_or(ChronoDuration::MAX);

        Self { invoker, loader, clock, entries, ttl, ttl_secs }
    }

    /// Cached descriptor for `media_id`, or `None` on a miss or after expiry.
    ///
    /// Never touches the network.
    pub fn get(&self, media_id: &str) -> Option<MediaDescriptor> {
        let cached = self.entries.get(media_id)?;
        if self.clock.now() >= cached.expires_at {
            debug!(media_id, expired_at = %cached.expires_at, "Media cache entry expired");
            self.entries.invalidate(media_id);
            return None;
        }
        Some(cached.descriptor)
    }

    /// Return the cached descriptor for `media_id`, uploading `source` on a
    /// miss.
    ///
    /// The fresh upload is cached under the id returned by the service,
    /// which may differ from `media_id`. Pass `None` when no id is known yet.
    #[instrument(skip(self, source), fields(agent = %agent))]
    pub async fn get_or_create(
        &self,
        media_id: Option<&str>,
        source: &MediaSource,
        agent: &AgentKey,
    ) -> Result<MediaDescriptor> {
        if let Some(descriptor) = media_id.and_then(|id| self.get(id)) {
            debug!("Media cache hit");
            return Ok(descriptor);
        }
        self.create(source, agent).await
    }

    /// Load and upload `source` regardless of cache state, then cache the
    /// result under its new remote id.
    #[instrument(skip(self, source), fields(agent = %agent))]
    pub async fn create(&self, source: &MediaSource, agent: &AgentKey) -> Result<MediaDescriptor> {
        let descriptor = self.loader.load(source).await?;
        let descriptor = self.upload(agent, descriptor).await?;
        self.insert(descriptor.clone());
        Ok(descriptor)
    }

    /// Upload a loaded descriptor and attach the returned media id.
    ///
    /// Does not touch the cache.
    ///
    /// # Errors
    /// - `InvalidInput` for empty or already uploaded descriptors
    /// - `InvalidResponse` when the service omits `media_id`
    pub async fn upload(
        &self,
        agent: &AgentKey,
        mut descriptor: MediaDescriptor,
    ) -> Result<MediaDescriptor> {
        if descriptor.is_empty() {
            return Err(WeComError::InvalidInput(format!(
                "media '{}' has no content",
                descriptor.file_name()
            )));
        }
        if let Some(existing) = descriptor.media_id() {
            return Err(WeComError::InvalidInput(format!("media already uploaded as {existing}")));
        }

        let request = ApiRequest::post_multipart(
            PATH_MEDIA_UPLOAD,
            MultipartFile {
                part_name: MEDIA_UPLOAD_PART.to_string(),
                file_name: descriptor.file_name().to_string(),
                content_type: descriptor.content_type().to_string(),
                content: descriptor.content().clone(),
            },
        )
        .with_query("type", descriptor.kind().as_str());

        let response = self.invoker.execute(agent, request).await?;
        let media_id = response.str_field(FIELD_MEDIA_ID).ok_or_else(|| {
            WeComError::InvalidResponse("media upload response has no media_id".into())
        })?;
        descriptor.attach_media_id(media_id)?;

        info!(
            media_id,
            kind = %descriptor.kind(),
            bytes = descriptor.len(),
            "Media uploaded"
        );
        Ok(descriptor)
    }

    /// Fetch the raw content of a remote media id. The cache is not
    /// populated.
    #[instrument(skip(self), fields(agent = %agent))]
    pub async fn download(&self, agent: &AgentKey, media_id: &str) -> Result<MediaDescriptor> {
        if media_id.is_empty() {
            return Err(WeComError::InvalidInput("media id must not be empty".into()));
        }

        let request = ApiRequest::get(PATH_MEDIA_GET).with_query(FIELD_MEDIA_ID, media_id);
        let response = self.invoker.execute(agent, request).await?;

        match response.payload {
            ResponsePayload::Binary(body) => {
                let file_name = body.file_name.unwrap_or_else(|| media_id.to_string());
                debug!(bytes = body.content.len(), file_name = %file_name, "Media downloaded");
                Ok(MediaDescriptor::downloaded(media_id, file_name, body.content_type, body.content))
            }
            ResponsePayload::Json(_) => Err(WeComError::InvalidResponse(
                "media download returned JSON instead of content".into(),
            )),
        }
    }

    /// Drop one entry.
    pub fn invalidate(&self, media_id: &str) {
        self.entries.invalidate(media_id);
        debug!(media_id, "Media cache entry invalidated");
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn stats(&self) -> MediaCacheStats {
        self.entries.run_pending_tasks();
        MediaCacheStats { entry_count: self.entries.entry_count(), ttl_secs: self.ttl_secs }
    }

    fn insert(&self, descriptor: MediaDescriptor) {
        let Some(media_id) = descriptor.media_id().map(str::to_string) else {
            return;
        };
        let expires_at =
            self.clock.now().checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(media_id = %media_id, expires_at = %expires_at, "Media cached");
        self.entries.insert(media_id, CachedMedia { descriptor, expires_at });
    }
}
