//! Safe mutation pipeline
//!
//! One put or delete against one node:
//!
//! ```text
//! Read -> Classify -> Convert -> Compare -> Confirm -> Backup -> Write
//!                                   |           |
//!                                 NoOp       Declined
//! ```
//!
//! # Guarantees
//!
//! - The version read first is the version the write is conditioned on
//! - Existing content is backed up before it is overwritten or deleted
//! - A format change is refused; the node must be deleted first
//! - Structured content that does not re-encode byte-for-byte is never
//!   rewritten
//! - Identical content is never rewritten
//! - A version conflict is reported, never retried
//!
//! Read-only `get` and `list` live here too, so every command resolves
//! paths and classifies content the same way.

mod console;
mod errors;
mod listing;

pub use console::{Console, ScriptedConsole};
pub use errors::{PipelineError, PipelineResult};
pub use listing::{render_listing, ListEntry, MAX_LIST_DEPTH};

use std::fmt;
use std::path::PathBuf;

use crate::backup::BackupStore;
use crate::codec::MessageCodec;
use crate::diff::DiffRenderer;
use crate::format::{editable_text, to_export, to_wire, Format, FormatDetector, RequestedFormat};
use crate::observability::{log_event, Event, Logger, ObservationScope};
use crate::store::{Namespace, StoreClient, StoredNode};

/// Pipeline stage, logged on entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Classify,
    Convert,
    Compare,
    Confirm,
    Backup,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Classify => "classify",
            Stage::Convert => "convert",
            Stage::Compare => "compare",
            Stage::Confirm => "confirm",
            Stage::Backup => "backup",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a put ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// Stored bytes already equal the requested bytes
    Unchanged,
    /// Operator said no
    Declined,
    Created { bytes: usize },
    Updated { bytes: usize, backup: PathBuf },
}

impl PutOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PutOutcome::Unchanged => "unchanged",
            PutOutcome::Declined => "declined",
            PutOutcome::Created { .. } => "created",
            PutOutcome::Updated { .. } => "updated",
        }
    }
}

/// How a delete ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    AlreadyAbsent,
    Declined,
    Deleted { backup: PathBuf },
}

impl DeleteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::AlreadyAbsent => "already_absent",
            DeleteOutcome::Declined => "declined",
            DeleteOutcome::Deleted { .. } => "deleted",
        }
    }
}

/// A node as returned by `get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Absolute path
    pub path: String,
    /// Raw stored bytes
    pub content: Vec<u8>,
    pub version: i32,
    pub format: Format,
    /// JSON for structured messages, raw bytes otherwise
    pub export: Vec<u8>,
    /// The export omits stored fields the codec does not model
    pub lossy: bool,
}

/// Put/delete/get/list against one service namespace
pub struct MutationPipeline<S> {
    store: S,
    namespace: Namespace,
    codec: MessageCodec,
    backups: BackupStore,
    logger: Logger,
}

impl<S: StoreClient> MutationPipeline<S> {
    pub fn new(store: S, namespace: Namespace, codec: MessageCodec, backups: BackupStore, logger: Logger) -> Self {
        Self {
            store,
            namespace,
            codec,
            backups,
            logger,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Store `local` at `path`, after showing the diff and asking
    ///
    /// `force` skips the question but never the backup.
    pub fn put(
        &self,
        path: &str,
        local: &[u8],
        requested: RequestedFormat,
        force: bool,
        console: &mut dyn Console,
    ) -> PipelineResult<PutOutcome> {
        let abs = self.namespace.resolve(path);
        let scope = ObservationScope::with_fields(&self.logger, "PUT", &[("path", abs.as_str())]);

        match self.put_at(&abs, local, requested, force, console) {
            Ok(outcome) => {
                scope.complete_with_fields(&[("outcome", outcome.as_str())]);
                Ok(outcome)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn put_at(
        &self,
        abs: &str,
        local: &[u8],
        requested: RequestedFormat,
        force: bool,
        console: &mut dyn Console,
    ) -> PipelineResult<PutOutcome> {
        self.enter(Stage::Read, abs);
        let current = self.read(abs)?;

        self.enter(Stage::Classify, abs);
        let detector = FormatDetector::new(&self.codec, &self.logger);
        let format = detector.resolve_local(local, requested);
        if let Some(node) = &current {
            let existing = detector.detect(&node.content);
            if existing != format {
                return Err(PipelineError::FormatMismatch {
                    path: abs.to_string(),
                    existing,
                    requested: format,
                });
            }
            if existing == Format::StructuredMessage {
                self.ensure_lossless(abs, &node.content)?;
            }
        }

        self.enter(Stage::Convert, abs);
        let wire = to_wire(&self.codec, local, format)?;

        self.enter(Stage::Compare, abs);
        let old = current.as_ref().map(|n| n.content.as_slice());
        if old == Some(wire.as_slice()) {
            log_event(&self.logger, Event::NoChange, &[("path", abs)]);
            console.println(&format!(
                "Content of {} matches requested value. Nothing to do, exiting.",
                abs
            ))?;
            return Ok(PutOutcome::Unchanged);
        }

        let diff = DiffRenderer::new(&self.codec).render(abs, old, &wire, format)?;
        console.print(&diff)?;
        log_event(
            &self.logger,
            Event::DiffRendered,
            &[("format", format.as_str()), ("path", abs)],
        );

        self.enter(Stage::Confirm, abs);
        if !force && !console.confirm(&format!("Apply the above changes to {}?", abs))? {
            log_event(&self.logger, Event::ConfirmDeclined, &[("path", abs)]);
            return Ok(PutOutcome::Declined);
        }

        let bytes = wire.len();
        let bytes_field = bytes.to_string();
        let outcome = match current {
            Some(node) => {
                self.enter(Stage::Backup, abs);
                let backup = self.backup(abs, &node.content, console)?;

                self.enter(Stage::Write, abs);
                let version = self
                    .store
                    .set(abs, &wire, node.version)
                    .map_err(|e| self.store_error(abs, Some(node.version), e))?;
                let version = version.to_string();
                log_event(
                    &self.logger,
                    Event::NodeWritten,
                    &[("bytes", bytes_field.as_str()), ("path", abs), ("version", version.as_str())],
                );
                PutOutcome::Updated { bytes, backup }
            }
            None => {
                self.enter(Stage::Write, abs);
                self.store
                    .create(abs, &wire)
                    .map_err(|e| self.store_error(abs, None, e))?;
                log_event(
                    &self.logger,
                    Event::NodeCreated,
                    &[("bytes", bytes_field.as_str()), ("path", abs)],
                );
                PutOutcome::Created { bytes }
            }
        };

        console.println(&format!("Stored {} bytes in {}.", bytes, abs))?;
        self.restart_reminder(console)?;
        Ok(outcome)
    }

    /// Remove the node at `path`, after showing its content and asking
    ///
    /// The content is backed up even when `force` is set.
    pub fn delete(&self, path: &str, force: bool, console: &mut dyn Console) -> PipelineResult<DeleteOutcome> {
        let abs = self.namespace.resolve(path);
        let scope = ObservationScope::with_fields(&self.logger, "DELETE", &[("path", abs.as_str())]);

        match self.delete_at(&abs, force, console) {
            Ok(outcome) => {
                scope.complete_with_fields(&[("outcome", outcome.as_str())]);
                Ok(outcome)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn delete_at(&self, abs: &str, force: bool, console: &mut dyn Console) -> PipelineResult<DeleteOutcome> {
        self.enter(Stage::Read, abs);
        let node = match self.read(abs)? {
            Some(node) => node,
            None => {
                console.println(&format!(
                    "Requested node {} is already absent. Nothing to do, exiting.",
                    abs
                ))?;
                return Ok(DeleteOutcome::AlreadyAbsent);
            }
        };

        self.enter(Stage::Classify, abs);
        let format = FormatDetector::new(&self.codec, &self.logger).detect(&node.content);
        let text = editable_text(&self.codec, &node.content, format)?;
        console.println(&format!("Current content of {} ({} bytes):", abs, node.content.len()))?;
        console.print(&text)?;

        self.enter(Stage::Confirm, abs);
        if !force && !console.confirm(&format!("Delete {}?", abs))? {
            log_event(&self.logger, Event::ConfirmDeclined, &[("path", abs)]);
            return Ok(DeleteOutcome::Declined);
        }

        self.enter(Stage::Backup, abs);
        let backup = self.backup(abs, &node.content, console)?;

        self.enter(Stage::Write, abs);
        self.store
            .delete(abs, node.version)
            .map_err(|e| self.store_error(abs, Some(node.version), e))?;
        log_event(&self.logger, Event::NodeDeleted, &[("path", abs)]);

        console.println(&format!("Deleted {}.", abs))?;
        self.restart_reminder(console)?;
        Ok(DeleteOutcome::Deleted { backup })
    }

    /// Current content of `path`, or `None` when absent
    ///
    /// A fixed `proto` format on content that does not decode is an error.
    pub fn get(&self, path: &str, requested: RequestedFormat) -> PipelineResult<Option<NodeSnapshot>> {
        let abs = self.namespace.resolve(path);
        let node = match self.read(&abs)? {
            Some(node) => node,
            None => return Ok(None),
        };

        let format = FormatDetector::new(&self.codec, &self.logger).resolve(&node.content, requested);
        let export = to_export(&self.codec, &node.content, format)?;
        let lossy = format == Format::StructuredMessage
            && self.codec.ensure_lossless(&node.content).is_err();
        if lossy {
            self.logger.warn(
                Event::LossyContent.as_str(),
                &[("path", abs.as_str()), ("reason", "exported JSON omits unmodelled fields")],
            );
        }
        Ok(Some(NodeSnapshot {
            path: abs,
            content: node.content,
            version: node.version,
            format,
            export,
            lossy,
        }))
    }

    /// Children of `path`, or the whole subtree when `recursive`
    pub fn list(&self, path: &str, recursive: bool) -> PipelineResult<Vec<ListEntry>> {
        let abs = self.namespace.resolve(path);
        let scope = ObservationScope::with_fields(&self.logger, "LIST", &[("path", abs.as_str())]);

        let result = if recursive {
            listing::walk(&self.store, &abs, &self.logger)
        } else {
            listing::immediate(&self.store, &abs)
        };
        match result {
            Ok(entries) => {
                let count = entries.len().to_string();
                scope.complete_with_fields(&[("entries", count.as_str())]);
                Ok(entries)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn read(&self, abs: &str) -> PipelineResult<Option<StoredNode>> {
        match self.store.get(abs) {
            Ok(node) => {
                let bytes = node.content.len().to_string();
                let version = node.version.to_string();
                log_event(
                    &self.logger,
                    Event::NodeRead,
                    &[("bytes", bytes.as_str()), ("path", abs), ("version", version.as_str())],
                );
                Ok(Some(node))
            }
            Err(e) if e.is_not_found() => {
                log_event(&self.logger, Event::NodeAbsent, &[("path", abs)]);
                Ok(None)
            }
            Err(e) => Err(self.store_error(abs, None, e)),
        }
    }

    fn backup(&self, abs: &str, content: &[u8], console: &mut dyn Console) -> PipelineResult<PathBuf> {
        let backup = self.backups.backup(abs, content)?;
        console.println(&format!(
            "Backed up previous contents of {} to: {}",
            abs,
            backup.display()
        ))?;
        Ok(backup)
    }

    /// Refuse to rewrite structured content the codec cannot reproduce
    fn ensure_lossless(&self, abs: &str, content: &[u8]) -> PipelineResult<()> {
        self.codec.ensure_lossless(content).map_err(|e| {
            self.logger.warn(Event::LossyContent.as_str(), &[("path", abs)]);
            PipelineError::Codec(e)
        })
    }

    fn store_error(&self, abs: &str, expected: Option<i32>, err: crate::store::StoreError) -> PipelineError {
        let err = PipelineError::from_store(abs, expected, err);
        if err.is_version_conflict() {
            log_event(&self.logger, Event::VersionConflict, &[("path", abs)]);
        }
        err
    }

    fn restart_reminder(&self, console: &mut dyn Console) -> PipelineResult<()> {
        console.println(&format!(
            "You must restart the '{}' process for this change to take effect.",
            self.namespace.service()
        ))?;
        Ok(())
    }

    fn enter(&self, stage: Stage, abs: &str) {
        log_event(
            &self.logger,
            Event::StageEntered,
            &[("path", abs), ("stage", stage.as_str())],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupConfig;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    const ROOT: &str = "/dcos-service-hello";

    fn pipeline(store: MemoryStore, backups: &TempDir) -> MutationPipeline<MemoryStore> {
        MutationPipeline::new(
            store,
            Namespace::for_service("hello"),
            MessageCodec::mesos().unwrap(),
            BackupStore::new(BackupConfig::in_dir(backups.path()), Logger::disabled()),
            Logger::disabled(),
        )
    }

    #[test]
    fn test_put_creates_absent_node() {
        let backups = TempDir::new().unwrap();
        let pipeline = pipeline(MemoryStore::new(), &backups);
        let mut console = ScriptedConsole::answering(&[true]);

        let outcome = pipeline
            .put("cfg", b"a=1\n", RequestedFormat::Auto, false, &mut console)
            .unwrap();

        assert_eq!(outcome, PutOutcome::Created { bytes: 4 });
        assert_eq!(pipeline.store().content("/dcos-service-hello/cfg").unwrap(), b"a=1\n");
        let output = console.output();
        assert!(output.contains("New node /dcos-service-hello/cfg (4 bytes):"));
        assert!(output.contains("Stored 4 bytes in /dcos-service-hello/cfg."));
        assert!(output.contains("You must restart the 'hello' process"));
        assert_eq!(fs_count(&backups), 0);
    }

    #[test]
    fn test_put_identical_is_noop() {
        let backups = TempDir::new().unwrap();
        let store = MemoryStore::new().with_node("/dcos-service-hello/cfg", b"a=1\n");
        let pipeline = pipeline(store, &backups);
        let mut console = ScriptedConsole::silent();

        let outcome = pipeline
            .put("/cfg/", b"a=1\n", RequestedFormat::Auto, false, &mut console)
            .unwrap();

        assert_eq!(outcome, PutOutcome::Unchanged);
        assert!(console.questions().is_empty());
        assert!(!console.output().contains("Changes to"));
        assert_eq!(pipeline.store().mutation_count(), 0);
    }

    #[test]
    fn test_put_declined_has_no_side_effects() {
        let backups = TempDir::new().unwrap();
        let store = MemoryStore::new().with_node("/dcos-service-hello/cfg", b"a=1\n");
        let pipeline = pipeline(store, &backups);
        let mut console = ScriptedConsole::answering(&[false]);

        let outcome = pipeline
            .put("cfg", b"a=2\n", RequestedFormat::Auto, false, &mut console)
            .unwrap();

        assert_eq!(outcome, PutOutcome::Declined);
        assert_eq!(console.questions(), ["Apply the above changes to /dcos-service-hello/cfg?"]);
        assert_eq!(pipeline.store().mutation_count(), 0);
        assert_eq!(fs_count(&backups), 0);
    }

    #[test]
    fn test_put_format_mismatch() {
        let backups = TempDir::new().unwrap();
        let store = MemoryStore::new().with_node("/dcos-service-hello/blob", &[0x00, 0x01]);
        let pipeline = pipeline(store, &backups);
        let mut console = ScriptedConsole::silent();

        let err = pipeline
            .put("blob", b"text\n", RequestedFormat::Auto, true, &mut console)
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::FormatMismatch {
                existing: Format::Binary,
                requested: Format::Text,
                ..
            }
        ));
        assert_eq!(pipeline.store().mutation_count(), 0);
    }

    #[test]
    fn test_put_forced_overwrite_backs_up() {
        let backups = TempDir::new().unwrap();
        let store = MemoryStore::new().with_node_at_version("/dcos-service-hello/cfg", b"old\n", 4);
        let pipeline = pipeline(store, &backups);
        let mut console = ScriptedConsole::silent();

        let outcome = pipeline
            .put("cfg", b"new\n", RequestedFormat::Auto, true, &mut console)
            .unwrap();

        let backup = match outcome {
            PutOutcome::Updated { bytes: 4, backup } => backup,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(std::fs::read(&backup).unwrap(), b"old\n");
        assert_eq!(pipeline.store().version("/dcos-service-hello/cfg"), Some(5));
        let output = console.output();
        assert!(output.contains("- old"));
        assert!(output.contains("+ new"));
        assert!(output.find("Backed up").unwrap() < output.find("Stored").unwrap());
    }

    #[test]
    fn test_delete_absent() {
        let backups = TempDir::new().unwrap();
        let pipeline = pipeline(MemoryStore::new(), &backups);
        let mut console = ScriptedConsole::silent();

        let outcome = pipeline.delete("gone", false, &mut console).unwrap();
        assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
        assert!(console.output().contains("already absent"));
        assert_eq!(fs_count(&backups), 0);
    }

    #[test]
    fn test_delete_with_children_refused_after_backup() {
        let backups = TempDir::new().unwrap();
        let store = MemoryStore::new()
            .with_node("/dcos-service-hello/parent", b"p")
            .with_node("/dcos-service-hello/parent/child", b"c");
        let pipeline = pipeline(store, &backups);
        let mut console = ScriptedConsole::silent();

        let err = pipeline.delete("parent", true, &mut console).unwrap_err();
        assert_eq!(err.code(), "NODEGUARD_NODE_HAS_CHILDREN");
        assert!(pipeline.store().content("/dcos-service-hello/parent").is_some());
    }

    #[test]
    fn test_get_export_forms() {
        let backups = TempDir::new().unwrap();
        let store = MemoryStore::new().with_node("/dcos-service-hello/cfg", b"a=1");
        let pipeline = pipeline(store, &backups);

        let snapshot = pipeline.get("cfg", RequestedFormat::Auto).unwrap().unwrap();
        assert_eq!(snapshot.format, Format::Text);
        assert_eq!(snapshot.export, b"a=1");
        assert_eq!(snapshot.version, 0);

        assert!(pipeline.get("missing", RequestedFormat::Auto).unwrap().is_none());
        assert!(matches!(
            pipeline.get("cfg", RequestedFormat::Fixed(Format::StructuredMessage)),
            Err(PipelineError::Codec(_))
        ));
    }

    #[test]
    fn test_put_logs_scope_and_stages() {
        let backups = TempDir::new().unwrap();
        let (logger, capture) = Logger::capture();
        let pipeline = MutationPipeline::new(
            MemoryStore::new(),
            Namespace::for_service("hello"),
            MessageCodec::mesos().unwrap(),
            BackupStore::new(BackupConfig::in_dir(backups.path()), logger.clone()),
            logger,
        );
        pipeline
            .put("cfg", b"x", RequestedFormat::Auto, true, &mut ScriptedConsole::silent())
            .unwrap();

        assert!(capture.has_event("PUT_BEGIN"));
        assert!(capture.has_event("STAGE_ENTERED"));
        assert!(capture.has_event("NODE_CREATED"));
        assert!(capture.has_event("PUT_COMPLETE"));
        assert!(capture.contents().contains(ROOT));
    }

    fn fs_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
    }
}
