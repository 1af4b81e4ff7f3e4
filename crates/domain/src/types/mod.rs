//! Domain types and models
//!
//! Agent identities and tokens, media descriptors, message targets and
//! message contents.

pub mod agent;
pub mod media;
pub mod message;

pub use agent::{AccessToken, AgentKey};
pub use media::{MediaDescriptor, MediaKind, MediaSource};
pub use message::{Message, MessageContent, MessageSendResult, MessageTargets, TextCard, TextCardBuilder};
