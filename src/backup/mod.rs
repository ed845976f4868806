//! Backup subsystem for nodeguard
//!
//! Every overwrite or delete of existing node content is preceded by a
//! byte-exact copy of that content on local disk.
//!
//! # Layout
//!
//! ```text
//! $BACKUP_DIR or ~/.nodeguard/backup/      (0700)
//! ├── dcos-service-hello-config_20240309-070501_1f3a9c04.bak   (0600)
//! └── ...
//! ```
//!
//! # Algorithm
//!
//! 1. Resolve the backup directory
//! 2. Create it if missing
//! 3. Write the new backup file exclusively, fsync it
//! 4. Prune the oldest files beyond the retention cap
//!
//! Any failure aborts the caller's mutation.
//!
//! # Important
//!
//! Backups are never rewritten.
//! Pruning only runs after a successful write.

mod errors;
mod naming;
mod prune;

pub use errors::{BackupError, BackupResult};
pub use naming::{backup_file_name, flatten_path, BACKUP_SUFFIX};
pub use prune::prune_dir;

use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::observability::{log_event, Event, Logger};

/// Default retention cap
pub const MAX_BACKUP_COUNT: usize = 100;

/// Node payloads are at most this large, so retained backups stay under
/// `MAX_BACKUP_COUNT * MAX_NODE_SIZE` (100 MiB). Not enforced here.
pub const MAX_NODE_SIZE: usize = 1024 * 1024;

/// Environment variable overriding the backup directory
pub const BACKUP_DIR_ENV: &str = "BACKUP_DIR";

/// Backup directory relative to the operator's home
pub const DEFAULT_BACKUP_SUBDIR: &str = ".nodeguard/backup";

/// Where backups go and how many are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// Used instead of `~/.nodeguard/backup` when set
    pub dir_override: Option<PathBuf>,
    /// Retention cap, oldest removed first
    pub max_count: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir_override: None,
            max_count: MAX_BACKUP_COUNT,
        }
    }
}

impl BackupConfig {
    /// Backups in `dir`, default retention
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir_override: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Defaults, with `BACKUP_DIR` applied when set and non-empty
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Let `BACKUP_DIR` override the configured directory
    pub fn apply_env(&mut self) {
        if let Some(dir) = env::var_os(BACKUP_DIR_ENV).filter(|v| !v.is_empty()) {
            self.dir_override = Some(PathBuf::from(dir));
        }
    }
}

/// Writes and prunes backup files
#[derive(Debug, Clone)]
pub struct BackupStore {
    config: BackupConfig,
    logger: Logger,
}

impl BackupStore {
    pub fn new(config: BackupConfig, logger: Logger) -> Self {
        Self { config, logger }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Directory backups are written to
    pub fn resolve_dir(&self) -> BackupResult<PathBuf> {
        if let Some(dir) = &self.config.dir_override {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_BACKUP_SUBDIR))
            .ok_or_else(|| {
                BackupError::unavailable(format!(
                    "No home directory for storing backups and {} is not set. Refusing to modify data without a backup.",
                    BACKUP_DIR_ENV
                ))
            })
    }

    /// Persist `content` of the node at `abs_path`, then prune
    ///
    /// Returns the path of the new backup file.
    pub fn backup(&self, abs_path: &str, content: &[u8]) -> BackupResult<PathBuf> {
        let dir = self.resolve_dir()?;
        create_backup_dir(&dir)?;

        let name = backup_file_name(abs_path, &Local::now(), &mut rand::thread_rng());
        let file_path = dir.join(name);
        write_new_file(&file_path, content)?;

        let bytes = content.len().to_string();
        let file = file_path.display().to_string();
        log_event(
            &self.logger,
            Event::BackupWritten,
            &[("bytes", bytes.as_str()), ("file", file.as_str()), ("path", abs_path)],
        );

        let removed = prune_dir(&dir, self.config.max_count, Some(file_path.as_path()))?;
        if !removed.is_empty() {
            let count = removed.len().to_string();
            let dir_name = dir.display().to_string();
            log_event(
                &self.logger,
                Event::BackupPruned,
                &[("dir", dir_name.as_str()), ("removed", count.as_str())],
            );
        }

        Ok(file_path)
    }
}

fn create_backup_dir(dir: &Path) -> BackupResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|e| BackupError::io_error(format!("Unable to initialize backup directory {}", dir.display()), e))
}

fn write_new_file(path: &Path, content: &[u8]) -> BackupResult<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| BackupError::io_error_at_path(path, e))?;
    file.write_all(content)
        .map_err(|e| BackupError::io_error_at_path(path, e))?;
    file.sync_all()
        .map_err(|e| BackupError::io_error_at_path(path, e))?;
    Ok(())
}
