//! ZooKeeper-backed store client

use std::time::Duration;

use ::zookeeper::{Acl, CreateMode, WatchedEvent, Watcher, ZkError, ZooKeeper};

use super::{StoreClient, StoreError, StoreResult, StoredNode};
use crate::observability::{log_event, Event, Logger};

/// Forwards session events to the logger
struct SessionWatcher {
    logger: Logger,
}

impl Watcher for SessionWatcher {
    fn handle(&self, event: WatchedEvent) {
        let state = format!("{:?}", event.keeper_state);
        let path = event.path.unwrap_or_default();
        log_event(
            &self.logger,
            Event::StoreSessionEvent,
            &[("state", state.as_str()), ("path", path.as_str())],
        );
    }
}

/// A ZooKeeper session
///
/// The session is closed when the store is dropped.
pub struct ZkStore {
    client: ZooKeeper,
}

impl ZkStore {
    /// Connect to the ensemble
    pub fn connect(servers: &[String], timeout: Duration, logger: &Logger) -> StoreResult<Self> {
        let connect_string = servers.join(",");
        let watcher = SessionWatcher {
            logger: logger.clone(),
        };
        let client = ZooKeeper::connect(&connect_string, timeout, watcher).map_err(|e| {
            StoreError::Unavailable(format!(
                "Unable to connect to ZooKeeper at {}: {}",
                connect_string, e
            ))
        })?;

        log_event(logger, Event::StoreConnected, &[("servers", connect_string.as_str())]);
        Ok(Self { client })
    }
}

fn map_error(path: &str, expected_version: Option<i32>, err: ZkError) -> StoreError {
    match err {
        ZkError::NoNode => StoreError::NotFound(path.to_string()),
        ZkError::NodeExists => StoreError::AlreadyExists(path.to_string()),
        ZkError::NotEmpty => StoreError::NotEmpty(path.to_string()),
        ZkError::BadVersion => StoreError::VersionConflict {
            path: path.to_string(),
            expected: expected_version.unwrap_or(-1),
        },
        other => StoreError::Unavailable(format!("{} failed: {}", path, other)),
    }
}

impl StoreClient for ZkStore {
    fn children(&self, path: &str) -> StoreResult<Vec<String>> {
        let mut children = self
            .client
            .get_children(path, false)
            .map_err(|e| map_error(path, None, e))?;
        children.sort();
        Ok(children)
    }

    fn get(&self, path: &str) -> StoreResult<StoredNode> {
        let (content, stat) = self
            .client
            .get_data(path, false)
            .map_err(|e| map_error(path, None, e))?;
        Ok(StoredNode {
            content,
            version: stat.version,
        })
    }

    fn set(&self, path: &str, content: &[u8], expected_version: i32) -> StoreResult<i32> {
        let stat = self
            .client
            .set_data(path, content.to_vec(), Some(expected_version))
            .map_err(|e| map_error(path, Some(expected_version), e))?;
        Ok(stat.version)
    }

    fn create(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        self.client
            .create(
                path,
                content.to_vec(),
                Acl::open_unsafe().clone(),
                CreateMode::Persistent,
            )
            .map(|_| ())
            .map_err(|e| map_error(path, None, e))
    }

    fn delete(&self, path: &str, expected_version: i32) -> StoreResult<()> {
        self.client
            .delete(path, Some(expected_version))
            .map_err(|e| map_error(path, Some(expected_version), e))
    }
}

impl Drop for ZkStore {
    fn drop(&mut self) {
        let _ = self.client.close();
    }
}
