//! # Pipeline Errors
//!
//! Everything that can end a put, delete, get, or list. Absent nodes and
//! declined confirmations are outcomes, not errors.

use std::io;

use thiserror::Error;

use crate::backup::BackupError;
use crate::codec::CodecError;
use crate::format::Format;
use crate::store::StoreError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Store connection or session failure
    #[error("Coordination store unavailable while accessing {path}: {reason}")]
    StoreUnavailable { path: String, reason: String },

    /// Node changed between read and write
    #[error(
        "{path} was modified by another writer{}. Nothing was written; re-run to review the current content.",
        .expected.map(|v| format!(" (expected version {})", v)).unwrap_or_default()
    )]
    VersionConflict { path: String, expected: Option<i32> },

    /// Requested content format differs from the stored one
    #[error(
        "New data format {requested} doesn't match current format {existing} of {path}. To change the format, delete the node before writing new data."
    )]
    FormatMismatch {
        path: String,
        existing: Format,
        requested: Format,
    },

    /// Structured-message conversion failed
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// Backup could not be written; nothing was modified
    #[error("{0}")]
    BackupUnavailable(#[from] BackupError),

    /// Store refuses to delete a node with children
    #[error("{0} has children. Delete them first.")]
    NodeHasChildren(String),

    /// Listed path does not exist
    #[error("Node {0} does not exist")]
    NodeNotFound(String),

    /// Console or local file failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Map a store failure at `path`
    ///
    /// `expected` is the version a conditional operation was keyed on. A
    /// node vanishing or appearing under a conditional operation is a
    /// conflict like any version mismatch.
    pub fn from_store(path: &str, expected: Option<i32>, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(p) if expected.is_some() => PipelineError::VersionConflict {
                path: p,
                expected,
            },
            StoreError::NotFound(p) => PipelineError::NodeNotFound(p),
            StoreError::VersionConflict { path, expected } => PipelineError::VersionConflict {
                path,
                expected: Some(expected),
            },
            StoreError::AlreadyExists(p) => PipelineError::VersionConflict {
                path: p,
                expected: None,
            },
            StoreError::NotEmpty(p) => PipelineError::NodeHasChildren(p),
            StoreError::Unavailable(reason) => PipelineError::StoreUnavailable {
                path: path.to_string(),
                reason,
            },
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::StoreUnavailable { .. } => "NODEGUARD_STORE_UNAVAILABLE",
            PipelineError::VersionConflict { .. } => "NODEGUARD_VERSION_CONFLICT",
            PipelineError::FormatMismatch { .. } => "NODEGUARD_FORMAT_MISMATCH",
            PipelineError::Codec(_) => "NODEGUARD_CODEC_ERROR",
            PipelineError::BackupUnavailable(e) => e.code(),
            PipelineError::NodeHasChildren(_) => "NODEGUARD_NODE_HAS_CHILDREN",
            PipelineError::NodeNotFound(_) => "NODEGUARD_NODE_NOT_FOUND",
            PipelineError::Io(_) => "NODEGUARD_IO",
        }
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self, PipelineError::VersionConflict { .. })
    }
}
