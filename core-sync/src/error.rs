//! Error types for the sync engine

use thiserror::Error;

/// Sync engine errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// Bearer token could not be obtained; no HTTP call was made.
    #[error("Token acquisition failed: {0}")]
    Auth(#[from] core_auth::AuthError),

    /// The HTTP layer failed (connection, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] bridge_traits::BridgeError),

    /// The service answered with a non-2xx status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx with a body we could not parse.
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The continuation-token chain exceeded the configured bound.
    #[error("Page limit of {limit} exceeded while following continuation tokens")]
    PageLimitExceeded { limit: usize },

    /// A playlist patch carried an id but nothing to change.
    #[error("Playlist patch for {id} has no fields to update")]
    EmptyPatch { id: String },
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
