//! HTTP adapter for the conversational backend.

pub mod transport;

pub use transport::HttpTransport;
