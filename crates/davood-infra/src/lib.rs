//! Infrastructure layer for DavoodAI.
//!
//! Implements the ports defined in `davood-core`: a JSON-file key-value
//! store, the reqwest HTTP transport, and an external-command speech
//! speaker. Also hosts data-directory resolution, the `config.toml` loader
//! and the export writer.

pub mod config;
pub mod export;
pub mod filesystem;
pub mod http;
pub mod kv;
pub mod speech;
