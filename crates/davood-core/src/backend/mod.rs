//! Conversational backend abstractions: the HTTP transport port and the
//! offline fallback replies used when the backend cannot answer.

pub mod fallback;
pub mod transport;
