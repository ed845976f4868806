//! In-process store
//!
//! Mirrors ZooKeeper's version rules: a node is created at version 0 and
//! every successful `set` increments it. Parents are implicit, so listing a
//! prefix that only exists through its descendants still works.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{StoreClient, StoreError, StoreResult, StoredNode};

/// `BTreeMap`-backed store
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<BTreeMap<String, StoredNode>>,
    mutations: AtomicUsize,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a node at version 0
    pub fn with_node(self, path: &str, content: &[u8]) -> Self {
        self.with_node_at_version(path, content, 0)
    }

    /// Builder: add a node at an explicit version
    pub fn with_node_at_version(self, path: &str, content: &[u8], version: i32) -> Self {
        self.lock().insert(
            path.to_string(),
            StoredNode {
                content: content.to_vec(),
                version,
            },
        );
        self
    }

    /// Unconditional write from outside the pipeline, as another operator would
    ///
    /// Returns the node's new version. Not counted as a pipeline mutation.
    pub fn external_write(&self, path: &str, content: &[u8]) -> i32 {
        let mut nodes = self.lock();
        let node = nodes.entry(path.to_string()).or_insert(StoredNode {
            content: Vec::new(),
            version: -1,
        });
        node.content = content.to_vec();
        node.version += 1;
        node.version
    }

    /// Current content of a node
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().get(path).map(|n| n.content.clone())
    }

    /// Current version of a node
    pub fn version(&self, path: &str) -> Option<i32> {
        self.lock().get(path).map(|n| n.version)
    }

    /// Number of successful set/create/delete calls made through [`StoreClient`]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredNode>> {
        self.nodes.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }

    fn child_prefix(path: &str) -> String {
        if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        }
    }
}

impl StoreClient for MemoryStore {
    fn children(&self, path: &str) -> StoreResult<Vec<String>> {
        let nodes = self.lock();
        let prefix = Self::child_prefix(path);

        let mut names = BTreeSet::new();
        for key in nodes.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if let Some(first) = rest.split('/').next().filter(|s| !s.is_empty()) {
                    names.insert(first.to_string());
                }
            }
        }

        if names.is_empty() && path != "/" && !nodes.contains_key(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(names.into_iter().collect())
    }

    fn get(&self, path: &str) -> StoreResult<StoredNode> {
        self.lock()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn set(&self, path: &str, content: &[u8], expected_version: i32) -> StoreResult<i32> {
        let mut nodes = self.lock();
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        if node.version != expected_version {
            return Err(StoreError::VersionConflict {
                path: path.to_string(),
                expected: expected_version,
            });
        }
        node.content = content.to_vec();
        node.version += 1;
        let version = node.version;
        drop(nodes);

        self.record_mutation();
        Ok(version)
    }

    fn create(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        let mut nodes = self.lock();
        if nodes.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        nodes.insert(
            path.to_string(),
            StoredNode {
                content: content.to_vec(),
                version: 0,
            },
        );
        drop(nodes);

        self.record_mutation();
        Ok(())
    }

    fn delete(&self, path: &str, expected_version: i32) -> StoreResult<()> {
        let mut nodes = self.lock();
        let version = nodes
            .get(path)
            .map(|n| n.version)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        if version != expected_version {
            return Err(StoreError::VersionConflict {
                path: path.to_string(),
                expected: expected_version,
            });
        }
        let prefix = Self::child_prefix(path);
        if nodes.keys().any(|k| k.starts_with(&prefix)) {
            return Err(StoreError::NotEmpty(path.to_string()));
        }
        nodes.remove(path);
        drop(nodes);

        self.record_mutation();
        Ok(())
    }
}
