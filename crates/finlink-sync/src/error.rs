//! Error types for the reconciliation engine.

use finlink_provider::ProviderError;
use thiserror::Error;

/// Error that can occur during a sync or dispatch operation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Talking to the upstream provider failed (after retries, if the
    /// error was transient).
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A database read or write failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A webhook payload could not be interpreted.
    #[error("malformed webhook event: {message}")]
    MalformedEvent { message: String },
}

impl SyncError {
    /// Create a malformed-event error.
    pub fn malformed_event(message: impl Into<String>) -> Self {
        SyncError::MalformedEvent {
            message: message.into(),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
