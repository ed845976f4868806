//! Shared helpers for integration tests

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use nodeguard::backup::{BackupConfig, BackupStore};
use nodeguard::codec::MessageCodec;
use nodeguard::observability::Logger;
use nodeguard::pipeline::MutationPipeline;
use nodeguard::store::{MemoryStore, Namespace, StoreClient, StoreResult, StoredNode};
use tempfile::TempDir;

pub const SERVICE: &str = "hello";

/// Absolute path of `rel` under the test service root
pub fn abs(rel: &str) -> String {
    format!("/dcos-service-{}/{}", SERVICE, rel)
}

/// Pipeline over `store`, backing up into `backups`
pub fn pipeline<S: StoreClient>(store: S, backups: &TempDir) -> MutationPipeline<S> {
    pipeline_with_logger(store, backups, Logger::disabled())
}

pub fn pipeline_with_logger<S: StoreClient>(store: S, backups: &TempDir, logger: Logger) -> MutationPipeline<S> {
    MutationPipeline::new(
        store,
        Namespace::for_service(SERVICE),
        MessageCodec::mesos().expect("mesos schemas are unambiguous"),
        BackupStore::new(BackupConfig::in_dir(backups.path()), logger.clone()),
        logger,
    )
}

/// Backup files currently on disk, sorted by name
pub fn backup_files(backups: &TempDir) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(backups.path())
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default();
    files.sort();
    files
}

/// Store where another writer updates `path` right after our first read
pub struct RacingStore {
    pub inner: MemoryStore,
    path: String,
    content: Vec<u8>,
    fired: Cell<bool>,
}

impl RacingStore {
    pub fn new(inner: MemoryStore, path: &str, content: &[u8]) -> Self {
        Self {
            inner,
            path: path.to_string(),
            content: content.to_vec(),
            fired: Cell::new(false),
        }
    }
}

impl StoreClient for RacingStore {
    fn children(&self, path: &str) -> StoreResult<Vec<String>> {
        self.inner.children(path)
    }

    fn get(&self, path: &str) -> StoreResult<StoredNode> {
        let node = self.inner.get(path);
        if path == self.path && !self.fired.replace(true) {
            self.inner.external_write(&self.path, &self.content);
        }
        node
    }

    fn set(&self, path: &str, content: &[u8], expected_version: i32) -> StoreResult<i32> {
        self.inner.set(path, content, expected_version)
    }

    fn create(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        self.inner.create(path, content)
    }

    fn delete(&self, path: &str, expected_version: i32) -> StoreResult<()> {
        self.inner.delete(path, expected_version)
    }
}
