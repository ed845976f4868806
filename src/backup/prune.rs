//! Retention: keep at most N backup files, removing the oldest first

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::errors::{BackupError, BackupResult};

/// Remove the oldest regular files in `dir` until at most `max_count` remain
///
/// Files are ordered by modification time, then by name. `keep` is counted
/// but never removed, whatever its mtime. Returns the removed paths, oldest
/// first.
pub fn prune_dir(dir: &Path, max_count: usize, keep: Option<&Path>) -> BackupResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| BackupError::prune_failed(dir, e))?;

    let mut total = 0usize;
    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BackupError::prune_failed(dir, e))?;
        let metadata = entry.metadata().map_err(|e| BackupError::prune_failed(dir, e))?;
        if !metadata.is_file() {
            continue;
        }
        total += 1;
        let path = entry.path();
        if keep == Some(path.as_path()) {
            continue;
        }
        let modified = metadata.modified().map_err(|e| BackupError::prune_failed(dir, e))?;
        candidates.push((modified, path));
    }

    if total <= max_count {
        return Ok(Vec::new());
    }

    candidates.sort();
    let excess = total - max_count;
    let mut removed = Vec::with_capacity(excess);
    for (_, path) in candidates.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|e| BackupError::prune_failed(&path, e))?;
        removed.push(path);
    }
    Ok(removed)
}
