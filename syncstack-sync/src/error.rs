//! Error types for the sync layer.
//!
//! Only configuration faults are raised. Remote and persistence failures are
//! attached to the [`Exchange`](syncstack_types::Exchange) handed to
//! notifications and completion callbacks.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The record or record set has no base URL.
    #[error("missing base url for {0}")]
    MissingUrl(String),

    /// The record or record set has no resource name.
    #[error("missing resource name for {0}")]
    MissingName(String),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Http(String),
}
