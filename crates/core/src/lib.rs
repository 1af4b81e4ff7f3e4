//! # WeCom Core
//!
//! Client logic for the WeCom agent API, with no transport or filesystem
//! code of its own.
//!
//! This crate contains:
//! - Port interfaces (traits) for the HTTP transport, token authority,
//!   media loading and time
//! - The credential provider (per-agent token cache with coalesced fetches)
//! - The retryable invoker (one refresh-and-retry on a stale token)
//! - The media cache and the message dispatcher built on top of them
//!
//! ## Architecture Principles
//! - Only depends on `wecom-domain`
//! - All I/O goes through the ports in [`transport_ports`] and
//!   [`media_ports`]
//! - Deterministic tests via [`time::MockClock`] and scripted transports

pub mod credential;
pub mod dispatch;
pub mod invoker;
pub mod media;
pub mod media_ports;
pub mod time;
pub mod transport_ports;

// Re-export specific items to keep call sites short
pub use credential::{CredentialProvider, RemoteTokenAuthority, TokenAuthority};
pub use dispatch::{build_envelope, reconcile_invalid_targets, MessageDispatcher};
pub use invoker::{is_credential_expired, RetryableInvoker, MAX_ATTEMPTS};
pub use media::MediaCache;
pub use media_ports::MediaLoader;
pub use time::{Clock, MockClock, SystemClock};
pub use transport_ports::{
    ApiRequest, ApiResponse, BinaryBody, HttpMethod, MultipartFile, RequestBody, ResponsePayload,
    Transport,
};
