//! In-memory media loader

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use wecom_core::MediaLoader;
use wecom_domain::{MediaDescriptor, MediaSource, Result, WeComError};

/// Serves byte sources directly and file sources from a fixed map.
#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    loads: AtomicUsize,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaLoader for MemoryLoader {
    async fn load(&self, source: &MediaSource) -> Result<MediaDescriptor> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match source {
            MediaSource::Bytes { file_name, content } => {
                Ok(MediaDescriptor::from_file_name(file_name.clone(), content.clone()))
            }
            MediaSource::File(path) => {
                let key = path.to_string_lossy().to_string();
                let content = self
                    .files
                    .get(&key)
                    .ok_or_else(|| WeComError::Media(format!("{key} not found")))?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| key.clone());
                Ok(MediaDescriptor::from_file_name(file_name, content.clone()))
            }
        }
    }
}
