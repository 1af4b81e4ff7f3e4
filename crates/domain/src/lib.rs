//! # WeCom Domain
//!
//! Domain types and models for the WeCom agent client.
//!
//! This crate contains:
//! - Agent, token, media and message data types
//! - The client error taxonomy and Result alias
//! - Configuration structures
//! - Protocol constants (endpoints, wire field names, refreshable codes)
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
