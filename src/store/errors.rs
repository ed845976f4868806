//! # Store Errors
//!
//! Error types for coordination-store access.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Coordination-store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Node does not exist
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Conditional write rejected because the node changed since it was read
    #[error("Version mismatch at {path}: expected version {expected}")]
    VersionConflict { path: String, expected: i32 },

    /// Create rejected because the node exists
    #[error("Node already exists: {0}")]
    AlreadyExists(String),

    /// Delete rejected because the node has children
    #[error("Node has children: {0}")]
    NotEmpty(String),

    /// Connection or session failure
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the error reports an absent node
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
