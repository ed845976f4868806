//! # Backup Errors
//!
//! Any backup failure aborts the mutation that requested it: no node is
//! overwritten or deleted without a backup on disk.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for backup operations
pub type BackupResult<T> = Result<T, BackupError>;

/// Backup errors
#[derive(Debug, Error)]
pub enum BackupError {
    /// No override configured and no home directory
    #[error("{0}")]
    Unavailable(String),

    /// Directory creation or file write failed
    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Old backups could not be listed or removed
    #[error("Unable to prune backup directory {}: {source}", .path.display())]
    Prune {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        BackupError::Unavailable(message.into())
    }

    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        BackupError::Io {
            message: message.into(),
            source,
        }
    }

    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self::io_error(format!("I/O error at {}", path.display()), source)
    }

    pub fn prune_failed(path: &Path, source: io::Error) -> Self {
        BackupError::Prune {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BackupError::Unavailable(_) => "NODEGUARD_BACKUP_UNAVAILABLE",
            BackupError::Io { .. } => "NODEGUARD_BACKUP_IO",
            BackupError::Prune { .. } => "NODEGUARD_BACKUP_PRUNE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BackupError::unavailable("no home").code(),
            "NODEGUARD_BACKUP_UNAVAILABLE"
        );
        let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
        assert_eq!(
            BackupError::prune_failed(Path::new("/b"), io_err).code(),
            "NODEGUARD_BACKUP_PRUNE"
        );
    }

    #[test]
    fn test_io_error_names_path_and_cause() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
        let err = BackupError::io_error_at_path(Path::new("/tmp/b"), io_err);

        assert_eq!(err.code(), "NODEGUARD_BACKUP_IO");
        let display = err.to_string();
        assert!(display.contains("/tmp/b"));
        assert!(display.contains("disk full"));
        assert!(err.source().is_some());
    }
}
