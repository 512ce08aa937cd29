//! Decorative models: the particle field, the synthetic voice spectrum and
//! the splash loading progress.
//!
//! These carry no shared state with the chat flow. They are pure state
//! machines driven by an injected random source; the CLI turns them into
//! terminal frames.

pub mod particles;
pub mod spectrum;
pub mod splash;
