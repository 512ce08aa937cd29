//! Shared domain types for the DavoodAI chat client.
//!
//! Messages, transcript entries, exports, settings, outcomes of a backend
//! exchange, and the error enums shared by every layer.
//!
//! No infrastructure dependencies: only serde, chrono and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod exchange;
pub mod notice;
