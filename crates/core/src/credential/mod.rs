//! Access token acquisition and caching
//!
//! [`CredentialProvider`] keeps one cached token per agent and makes sure
//! concurrent callers for the same agent share a single fetch.

pub mod authority;
pub mod ports;
pub mod provider;

pub use authority::RemoteTokenAuthority;
pub use ports::TokenAuthority;
pub use provider::CredentialProvider;
