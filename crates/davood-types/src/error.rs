use thiserror::Error;

/// Failures of a single backend exchange.
///
/// Both kinds are absorbed by the session client and turned into a fallback
/// reply; they only surface in logs and in `SendOutcome::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The endpoint answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Transport { status: u16 },

    /// No usable response at all: DNS, connectivity, malformed body,
    /// deadline expiry, or cancellation.
    #[error("{0}")]
    Network(String),
}

/// Errors from the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised inside the presentation loop.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("render error: {0}")]
    Render(String),
}
