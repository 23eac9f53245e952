/// Structured error type for post store operations.
///
/// Every store operation resolves to `StoreResult<T>`. Validation failures
/// never reach storage; storage failures carry the operation name and the
/// identifier that was being worked on.
use thiserror::Error;

use crate::models::ValidationError;

/// Boxed backend error carried by [`StoreError::StorageFailure`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for post store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Post failed local validation; not retryable until the input changes
    #[error("invalid post: {0}")]
    InvalidPost(#[from] ValidationError),

    /// Caller supplied an id on create; ids are assigned by the store
    #[error("cannot create a post that already has an id (id={id})")]
    AlreadyExists { id: String },

    /// Lookup miss
    #[error("post not found (id={id})")]
    NotFound { id: String },

    /// Page size guard
    #[error("page limit {limit} exceeds maximum of {max} (channel_id={channel_id})")]
    LimitExceeded {
        channel_id: String,
        limit: u32,
        max: u32,
    },

    /// Any backing store error, with the failing identifier for diagnosis
    #[error("storage failure in {op} ({id}): {source}")]
    StorageFailure {
        op: &'static str,
        id: String,
        #[source]
        source: BoxError,
    },
}

/// Result type alias for post store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a storage failure for `op` working on `id`
    pub fn storage(op: &'static str, id: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::StorageFailure {
            op,
            id: id.into(),
            source: source.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
