//! Conversation state and flow.
//!
//! - `log`: the single ordered transcript with its context and display views.
//! - `client`: the session client (endpoint configuration, backend exchange).
//! - `view`: the rendering port driven by the presentation loop.
//! - `session`: the presentation loop (`ChatSession`).

pub mod client;
pub mod log;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
