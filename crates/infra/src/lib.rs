//! # WeCom Infrastructure
//!
//! Infrastructure implementations of the core ports, plus the client
//! facade that wires them together.
//!
//! This crate contains:
//! - The reqwest-based HTTP transport with retry and backoff
//! - Filesystem media loading
//! - Configuration loading from environment and TOML/JSON files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `wecom-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod media;
pub mod observability;

// Re-export commonly used items
pub use client::{WeComClient, WeComClientBuilder};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, HttpTransport};
pub use media::FsMediaLoader;
pub use observability::{init_tracing, LogFormat};
