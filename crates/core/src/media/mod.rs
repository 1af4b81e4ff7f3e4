//! Uploaded media cache
//!
//! Maps remote media identifiers to uploaded [`MediaDescriptor`]s for the
//! lifetime of a remote media id (three days by default).

pub mod cache;

pub use cache::{MediaCache, MediaCacheStats};
