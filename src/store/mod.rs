//! Coordination-store access
//!
//! The mutation pipeline talks to the store only through [`StoreClient`].
//! Paths handed to a client are absolute; [`Namespace`] resolves operator
//! paths before they get here.
//!
//! Two clients ship with the crate:
//! - [`ZkStore`]: a ZooKeeper session
//! - [`MemoryStore`]: in-process, with the same version semantics

mod errors;
mod memory;
mod namespace;
mod zk;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use namespace::{Namespace, DEFAULT_PREFIX};
pub use zk::ZkStore;

/// Content and version of an existing node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    pub content: Vec<u8>,
    pub version: i32,
}

/// Low-level node access
///
/// Every conditional operation takes the version the caller last observed;
/// the store rejects it with [`StoreError::VersionConflict`] when the node has
/// moved on.
pub trait StoreClient {
    /// Names of the immediate children of `path`
    fn children(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Content and version of `path`, or [`StoreError::NotFound`]
    fn get(&self, path: &str) -> StoreResult<StoredNode>;

    /// Overwrite `path` if its version still equals `expected_version`
    fn set(&self, path: &str, content: &[u8], expected_version: i32) -> StoreResult<i32>;

    /// Create `path`, failing with [`StoreError::AlreadyExists`] if present
    fn create(&self, path: &str, content: &[u8]) -> StoreResult<()>;

    /// Remove `path` if its version still equals `expected_version`
    fn delete(&self, path: &str, expected_version: i32) -> StoreResult<()>;
}

impl<T: StoreClient + ?Sized> StoreClient for &T {
    fn children(&self, path: &str) -> StoreResult<Vec<String>> {
        (**self).children(path)
    }

    fn get(&self, path: &str) -> StoreResult<StoredNode> {
        (**self).get(path)
    }

    fn set(&self, path: &str, content: &[u8], expected_version: i32) -> StoreResult<i32> {
        (**self).set(path, content, expected_version)
    }

    fn create(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        (**self).create(path, content)
    }

    fn delete(&self, path: &str, expected_version: i32) -> StoreResult<()> {
        (**self).delete(path, expected_version)
    }
}

impl<T: StoreClient + ?Sized> StoreClient for Box<T> {
    fn children(&self, path: &str) -> StoreResult<Vec<String>> {
        (**self).children(path)
    }

    fn get(&self, path: &str) -> StoreResult<StoredNode> {
        (**self).get(path)
    }

    fn set(&self, path: &str, content: &[u8], expected_version: i32) -> StoreResult<i32> {
        (**self).set(path, content, expected_version)
    }

    fn create(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        (**self).create(path, content)
    }

    fn delete(&self, path: &str, expected_version: i32) -> StoreResult<()> {
        (**self).delete(path, expected_version)
    }
}
