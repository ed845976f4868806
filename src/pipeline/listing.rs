//! Node tree listing
//!
//! Recursive listing walks an explicit stack, depth first, children in the
//! order the store returns them. Nodes at `MAX_LIST_DEPTH` are reported but
//! not descended into.

use crate::observability::{Event, Logger};
use crate::store::{StoreClient, StoreError};

use super::errors::{PipelineError, PipelineResult};

/// Deepest level a recursive listing descends to
pub const MAX_LIST_DEPTH: usize = 64;

/// One line of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// 0 for the listed node itself
    pub depth: usize,
    /// Last path segment; empty for the namespace root
    pub name: String,
    /// Whether the node is known to have children
    pub has_children: bool,
}

impl ListEntry {
    fn new(depth: usize, name: impl Into<String>, has_children: bool) -> Self {
        Self {
            depth,
            name: name.into(),
            has_children,
        }
    }
}

/// Two spaces of indent per level, `/` after nodes with children
pub fn render_listing(entries: &[ListEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&"  ".repeat(entry.depth));
        out.push_str(&entry.name);
        if entry.has_children {
            out.push('/');
        }
        out.push('\n');
    }
    out
}

fn leaf_name(abs: &str, depth: usize) -> &str {
    // the listed node is shown relative to the namespace root
    if depth == 0 && abs.matches('/').count() <= 1 {
        return "";
    }
    abs.rsplit('/').next().unwrap_or(abs)
}

fn child_path(parent: &str, child: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// The node at `abs` and its immediate children
pub(super) fn immediate<S: StoreClient>(store: &S, abs: &str) -> PipelineResult<Vec<ListEntry>> {
    let children = store
        .children(abs)
        .map_err(|e| PipelineError::from_store(abs, None, e))?;

    let mut entries = Vec::with_capacity(children.len() + 1);
    entries.push(ListEntry::new(0, leaf_name(abs, 0), true));
    entries.extend(children.into_iter().map(|name| ListEntry::new(1, name, false)));
    Ok(entries)
}

/// The whole subtree under `abs`, pre-order
pub(super) fn walk<S: StoreClient>(store: &S, abs: &str, logger: &Logger) -> PipelineResult<Vec<ListEntry>> {
    let mut entries = Vec::new();
    let mut stack = vec![(abs.to_string(), 0usize)];

    while let Some((path, depth)) = stack.pop() {
        let children = match store.children(&path) {
            Ok(children) => children,
            // removed while we were walking
            Err(StoreError::NotFound(_)) if depth > 0 => continue,
            Err(e) => return Err(PipelineError::from_store(&path, None, e)),
        };

        entries.push(ListEntry::new(
            depth,
            leaf_name(&path, depth),
            !children.is_empty(),
        ));

        if children.is_empty() {
            continue;
        }
        if depth >= MAX_LIST_DEPTH {
            let depth_field = depth.to_string();
            logger.warn(
                Event::ListingTruncated.as_str(),
                &[("depth", depth_field.as_str()), ("path", path.as_str())],
            );
            continue;
        }
        for child in children.iter().rev() {
            stack.push((child_path(&path, child), depth + 1));
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_immediate_listing() {
        let store = MemoryStore::new()
            .with_node("/dcos-service-x/a", b"")
            .with_node("/dcos-service-x/b/c", b"");
        let entries = immediate(&store, "/dcos-service-x").unwrap();
        assert_eq!(render_listing(&entries), "/\n  a\n  b\n");
    }

    #[test]
    fn test_recursive_listing_is_preorder() {
        let store = MemoryStore::new()
            .with_node("/dcos-service-x/a", b"")
            .with_node("/dcos-service-x/b/c", b"")
            .with_node("/dcos-service-x/b/d", b"");
        let entries = walk(&store, "/dcos-service-x", &Logger::disabled()).unwrap();
        assert_eq!(render_listing(&entries), "/\n  a\n  b/\n    c\n    d\n");
    }

    #[test]
    fn test_recursive_listing_of_subtree() {
        let store = MemoryStore::new().with_node("/dcos-service-x/b/c", b"");
        let entries = walk(&store, "/dcos-service-x/b", &Logger::disabled()).unwrap();
        assert_eq!(render_listing(&entries), "b/\n  c\n");
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let store = MemoryStore::new();
        let err = walk(&store, "/dcos-service-x/nope", &Logger::disabled()).unwrap_err();
        assert_eq!(err.code(), "NODEGUARD_NODE_NOT_FOUND");
    }

    #[test]
    fn test_depth_cap() {
        let mut path = String::from("/dcos-service-x");
        for i in 0..(MAX_LIST_DEPTH + 5) {
            path.push_str(&format!("/n{}", i));
        }
        let store = MemoryStore::new().with_node(&path, b"");
        let (logger, capture) = Logger::capture();

        let entries = walk(&store, "/dcos-service-x", &logger).unwrap();
        assert_eq!(entries.len(), MAX_LIST_DEPTH + 1);
        assert!(entries.iter().all(|e| e.depth <= MAX_LIST_DEPTH));
        assert!(entries.last().unwrap().has_children);
        assert!(capture.has_event("LISTING_TRUNCATED"));
    }
}
