//! Mutation Pipeline Tests
//!
//! End-to-end put/delete behavior against an in-memory store:
//! - New nodes are shown in full and created on confirmation
//! - Identical content is never rewritten
//! - A concurrent write between read and write is a conflict
//! - Existing content is always backed up before it is replaced or removed
//! - Stored fields the codec does not model are never silently dropped

mod common;

use common::{abs, backup_files, pipeline, pipeline_with_logger, RacingStore};
use nodeguard::codec::mesos::{TaskInfo, TaskState, TaskStatus};
use nodeguard::codec::{CodecError, DecodedMessage};
use nodeguard::format::{Format, RequestedFormat};
use nodeguard::observability::Logger;
use nodeguard::pipeline::{DeleteOutcome, PipelineError, PutOutcome, ScriptedConsole};
use nodeguard::store::MemoryStore;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn task_info_wire(name: &str) -> Vec<u8> {
    DecodedMessage::TaskInfo(TaskInfo::new(name, "web__1", "agent-1")).encode_to_vec()
}

// =============================================================================
// Put
// =============================================================================

/// Absent node, text content, confirmed.
#[test]
fn test_put_new_text_node() {
    let backups = TempDir::new().unwrap();
    let pipeline = pipeline(MemoryStore::new(), &backups);
    let mut console = ScriptedConsole::answering(&[true]);

    let outcome = pipeline
        .put("greeting", b"hello\n", RequestedFormat::Auto, false, &mut console)
        .unwrap();

    assert_eq!(outcome, PutOutcome::Created { bytes: 6 });
    let output = console.output();
    assert!(output.contains(&format!("New node {} (6 bytes):\nhello\n", abs("greeting"))));
    assert_eq!(pipeline.store().content(&abs("greeting")).unwrap(), b"hello\n");
    assert!(backup_files(&backups).is_empty());
}

/// Identical content: no diff, no prompt, no backup, no write.
#[test]
fn test_put_identical_content_is_noop() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("a"), b"a\n");
    let pipeline = pipeline(store, &backups);
    let mut console = ScriptedConsole::silent();

    let outcome = pipeline
        .put("a", b"a\n", RequestedFormat::Auto, false, &mut console)
        .unwrap();

    assert_eq!(outcome, PutOutcome::Unchanged);
    assert_eq!(
        console.output(),
        format!("Content of {} matches requested value. Nothing to do, exiting.\n", abs("a"))
    );
    assert!(console.questions().is_empty());
    assert_eq!(pipeline.store().mutation_count(), 0);
    assert!(backup_files(&backups).is_empty());
}

/// Another writer bumps the version between our read and our write.
#[test]
fn test_put_concurrent_write_is_version_conflict() {
    let backups = TempDir::new().unwrap();
    let inner = MemoryStore::new().with_node_at_version(&abs("cfg"), b"v=3\n", 3);
    let store = RacingStore::new(inner, &abs("cfg"), b"v=4 from someone else\n");
    let pipeline = pipeline(store, &backups);
    let mut console = ScriptedConsole::silent();

    let err = pipeline
        .put("cfg", b"v=mine\n", RequestedFormat::Auto, true, &mut console)
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::VersionConflict {
            expected: Some(3),
            ..
        }
    ));
    assert_eq!(err.code(), "NODEGUARD_VERSION_CONFLICT");

    let inner = &pipeline.store().inner;
    assert_eq!(inner.version(&abs("cfg")), Some(4));
    assert_eq!(inner.content(&abs("cfg")).unwrap(), b"v=4 from someone else\n");
    assert_eq!(inner.mutation_count(), 0);
}

/// Another writer creates the node while we prepare to create it.
#[test]
fn test_put_concurrent_create_is_version_conflict() {
    let backups = TempDir::new().unwrap();
    let store = RacingStore::new(MemoryStore::new(), &abs("new"), b"theirs\n");
    let pipeline = pipeline(store, &backups);

    let err = pipeline
        .put("new", b"mine\n", RequestedFormat::Auto, true, &mut ScriptedConsole::silent())
        .unwrap_err();

    assert!(err.is_version_conflict());
    assert_eq!(pipeline.store().inner.content(&abs("new")).unwrap(), b"theirs\n");
}

/// Conflicts are logged at FATAL.
#[test]
fn test_version_conflict_is_logged() {
    let backups = TempDir::new().unwrap();
    let (logger, capture) = Logger::capture();
    let inner = MemoryStore::new().with_node(&abs("cfg"), b"x\n");
    let store = RacingStore::new(inner, &abs("cfg"), b"y\n");
    let pipeline = pipeline_with_logger(store, &backups, logger);

    pipeline
        .put("cfg", b"z\n", RequestedFormat::Auto, true, &mut ScriptedConsole::silent())
        .unwrap_err();

    assert!(capture.has_event("VERSION_CONFLICT"));
    assert!(capture.has_event("PUT_FAILED"));
    assert!(capture.contents().contains("\"severity\":\"FATAL\""));
}

/// Text over a structured message is refused before anything is written.
#[test]
fn test_put_format_change_is_refused() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("Tasks/web/TaskInfo"), &task_info_wire("web"));
    let pipeline = pipeline(store, &backups);

    let err = pipeline
        .put(
            "Tasks/web/TaskInfo",
            b"just text\n",
            RequestedFormat::Auto,
            true,
            &mut ScriptedConsole::silent(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::FormatMismatch {
            existing: Format::StructuredMessage,
            requested: Format::Text,
            ..
        }
    ));
    assert_eq!(pipeline.store().mutation_count(), 0);
    assert!(backup_files(&backups).is_empty());
}

/// Editing a task's JSON updates the wire bytes and backs up the old ones.
#[test]
fn test_put_structured_message_from_json() {
    let backups = TempDir::new().unwrap();
    let old = task_info_wire("web");
    let store = MemoryStore::new().with_node(&abs("Tasks/web/TaskInfo"), &old);
    let pipeline = pipeline(store, &backups);

    let json = r#"{
  "name": "web-renamed",
  "task_id": {"value": "web__1"},
  "slave_id": {"value": "agent-1"}
}"#;
    let mut console = ScriptedConsole::answering(&[true]);
    let outcome = pipeline
        .put("Tasks/web/TaskInfo", json.as_bytes(), RequestedFormat::Auto, false, &mut console)
        .unwrap();

    let backup = match outcome {
        PutOutcome::Updated { backup, .. } => backup,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(fs::read(&backup).unwrap(), old);

    let stored = pipeline.store().content(&abs("Tasks/web/TaskInfo")).unwrap();
    assert_eq!(stored, task_info_wire("web-renamed"));

    let output = console.output();
    assert!(output.contains("-   \"name\": \"web\","));
    assert!(output.contains("+   \"name\": \"web-renamed\","));
    assert!(output.contains("    \"task_id\": {"));
}

/// Input that claims to be a structured message but is not one.
#[test]
fn test_put_forced_proto_rejects_garbage() {
    let backups = TempDir::new().unwrap();
    let pipeline = pipeline(MemoryStore::new(), &backups);

    let err = pipeline
        .put(
            "status",
            br#"{"task_id": {"value": "t"}}"#,
            RequestedFormat::Fixed(Format::StructuredMessage),
            true,
            &mut ScriptedConsole::silent(),
        )
        .unwrap_err();

    assert_eq!(err.code(), "NODEGUARD_CODEC_ERROR");
    assert!(err.to_string().contains("state"));
    assert_eq!(pipeline.store().mutation_count(), 0);
}

/// Stored status JSON can be edited as a TaskStatus.
#[test]
fn test_put_task_status_json_detected() {
    let backups = TempDir::new().unwrap();
    let old = DecodedMessage::TaskStatus(TaskStatus::new("t", TaskState::Running)).encode_to_vec();
    let store = MemoryStore::new().with_node(&abs("status"), &old);
    let pipeline = pipeline(store, &backups);

    let json = br#"{"task_id": {"value": "t"}, "state": "TASK_FAILED"}"#;
    pipeline
        .put("status", json, RequestedFormat::Auto, true, &mut ScriptedConsole::silent())
        .unwrap();

    let stored = pipeline.store().content(&abs("status")).unwrap();
    assert_eq!(
        stored,
        DecodedMessage::TaskStatus(TaskStatus::new("t", TaskState::Failed)).encode_to_vec()
    );
}

/// Declining leaves no trace.
#[test]
fn test_put_declined() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("cfg"), b"old\n");
    let pipeline = pipeline(store, &backups);
    let mut console = ScriptedConsole::answering(&[false]);

    let outcome = pipeline
        .put("cfg", b"new\n", RequestedFormat::Auto, false, &mut console)
        .unwrap();

    assert_eq!(outcome, PutOutcome::Declined);
    assert!(console.output().contains("Changes to"));
    assert_eq!(pipeline.store().content(&abs("cfg")).unwrap(), b"old\n");
    assert!(backup_files(&backups).is_empty());
}

/// The backup exists before the store write happens.
#[test]
fn test_backup_precedes_write() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("blob"), &[0x00, 0xff]);
    let pipeline = pipeline(store, &backups);
    let mut console = ScriptedConsole::silent();

    pipeline
        .put("blob", &[0x00, 0xfe], RequestedFormat::Auto, true, &mut console)
        .unwrap();

    let files = backup_files(&backups);
    assert_eq!(files.len(), 1);
    assert_eq!(fs::read(&files[0]).unwrap(), vec![0x00, 0xff]);

    let output = console.output();
    let backed_up = output.find("Backed up previous contents").unwrap();
    let stored = output.find("Stored 2 bytes").unwrap();
    assert!(backed_up < stored);
    assert!(output.contains("- 00000000  00 ff"));
}

/// Backup failure stops the write.
#[test]
fn test_backup_failure_blocks_write() {
    let backups = TempDir::new().unwrap();
    let blocker = backups.path().join("not-a-dir");
    fs::write(&blocker, b"").unwrap();

    let store = MemoryStore::new().with_node(&abs("cfg"), b"old\n");
    let pipeline = nodeguard::pipeline::MutationPipeline::new(
        store,
        nodeguard::store::Namespace::for_service(common::SERVICE),
        nodeguard::codec::MessageCodec::mesos().unwrap(),
        nodeguard::backup::BackupStore::new(
            nodeguard::backup::BackupConfig::in_dir(blocker.join("backups")),
            Logger::disabled(),
        ),
        Logger::disabled(),
    );

    let err = pipeline
        .put("cfg", b"new\n", RequestedFormat::Auto, true, &mut ScriptedConsole::silent())
        .unwrap_err();

    assert_eq!(err.code(), "NODEGUARD_BACKUP_IO");
    assert_eq!(pipeline.store().content(&abs("cfg")).unwrap(), b"old\n");
}

/// Binary input over a text node is refused, even when forced.
#[test]
fn test_put_forced_binary_over_text_is_refused() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("cfg"), b"a=1\n");
    let pipeline = pipeline(store, &backups);

    let err = pipeline
        .put(
            "cfg",
            &[0x00, 0x01],
            RequestedFormat::Fixed(Format::Binary),
            true,
            &mut ScriptedConsole::silent(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::FormatMismatch {
            existing: Format::Text,
            requested: Format::Binary,
            ..
        }
    ));
    assert_eq!(err.code(), "NODEGUARD_FORMAT_MISMATCH");
    assert_eq!(pipeline.store().content(&abs("cfg")).unwrap(), b"a=1\n");
    assert_eq!(pipeline.store().mutation_count(), 0);
    assert!(backup_files(&backups).is_empty());
}

// =============================================================================
// Unmodelled Fields
// =============================================================================

/// A task carrying a field the codec does not model (tag 5).
fn task_info_with_unknown_field() -> Vec<u8> {
    let mut wire = task_info_wire("web");
    wire.extend_from_slice(&[0x2a, 0x02, 0x0a, 0x00]);
    wire
}

/// Exporting lossy content flags it and logs a warning.
#[test]
fn test_get_flags_unmodelled_fields() {
    let backups = TempDir::new().unwrap();
    let (logger, capture) = Logger::capture();
    let store = MemoryStore::new().with_node(&abs("Tasks/web/TaskInfo"), &task_info_with_unknown_field());
    let pipeline = pipeline_with_logger(store, &backups, logger);

    let snapshot = pipeline
        .get("Tasks/web/TaskInfo", RequestedFormat::Auto)
        .unwrap()
        .unwrap();

    assert!(snapshot.lossy);
    assert_eq!(snapshot.format, Format::StructuredMessage);
    assert!(capture.has_event("LOSSY_CONTENT"));
}

/// Modelled content exports without the flag.
#[test]
fn test_get_known_fields_not_flagged() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("Tasks/web/TaskInfo"), &task_info_wire("web"));
    let pipeline = pipeline(store, &backups);

    let snapshot = pipeline
        .get("Tasks/web/TaskInfo", RequestedFormat::Auto)
        .unwrap()
        .unwrap();

    assert!(!snapshot.lossy);
}

/// Writing back an exported lossy node is refused and nothing changes.
#[test]
fn test_get_then_put_refuses_to_drop_fields() {
    let backups = TempDir::new().unwrap();
    let (logger, capture) = Logger::capture();
    let original = task_info_with_unknown_field();
    let store = MemoryStore::new().with_node(&abs("Tasks/web/TaskInfo"), &original);
    let pipeline = pipeline_with_logger(store, &backups, logger);

    let snapshot = pipeline
        .get("Tasks/web/TaskInfo", RequestedFormat::Auto)
        .unwrap()
        .unwrap();
    let err = pipeline
        .put(
            "Tasks/web/TaskInfo",
            &snapshot.export,
            RequestedFormat::Auto,
            true,
            &mut ScriptedConsole::silent(),
        )
        .unwrap_err();

    assert!(matches!(err, PipelineError::Codec(CodecError::Lossy { .. })));
    assert_eq!(err.code(), "NODEGUARD_CODEC_ERROR");
    assert_eq!(pipeline.store().content(&abs("Tasks/web/TaskInfo")).unwrap(), original);
    assert_eq!(pipeline.store().mutation_count(), 0);
    assert!(backup_files(&backups).is_empty());
    assert!(capture.has_event("PUT_FAILED"));
}

// =============================================================================
// Delete
// =============================================================================

/// Absent node: nothing to back up, nothing to do.
#[test]
fn test_delete_absent_node() {
    let backups = TempDir::new().unwrap();
    let pipeline = pipeline(MemoryStore::new(), &backups);
    let mut console = ScriptedConsole::silent();

    let outcome = pipeline.delete("gone", false, &mut console).unwrap();

    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
    assert!(console.output().contains("already absent"));
    assert!(backup_files(&backups).is_empty());
}

/// Forced delete still backs up.
#[test]
fn test_forced_delete_backs_up() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("cfg"), b"keep me\n");
    let pipeline = pipeline(store, &backups);
    let mut console = ScriptedConsole::silent();

    let outcome = pipeline.delete("cfg", true, &mut console).unwrap();

    let backup = match outcome {
        DeleteOutcome::Deleted { backup } => backup,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(fs::read(backup).unwrap(), b"keep me\n");
    assert!(pipeline.store().content(&abs("cfg")).is_none());
    assert!(console.output().contains("Current content of"));
    assert!(console.questions().is_empty());
}

/// Declined delete keeps the node and writes no backup.
#[test]
fn test_delete_declined() {
    let backups = TempDir::new().unwrap();
    let store = MemoryStore::new().with_node(&abs("cfg"), b"x\n");
    let pipeline = pipeline(store, &backups);
    let mut console = ScriptedConsole::answering(&[false]);

    let outcome = pipeline.delete("cfg", false, &mut console).unwrap();

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(console.questions(), [format!("Delete {}?", abs("cfg"))]);
    assert!(pipeline.store().content(&abs("cfg")).is_some());
    assert!(backup_files(&backups).is_empty());
}

/// Delete keyed on the version read; a concurrent write wins.
#[test]
fn test_delete_concurrent_write_is_version_conflict() {
    let backups = TempDir::new().unwrap();
    let inner = MemoryStore::new().with_node(&abs("cfg"), b"x\n");
    let store = RacingStore::new(inner, &abs("cfg"), b"y\n");
    let pipeline = pipeline(store, &backups);

    let err = pipeline
        .delete("cfg", true, &mut ScriptedConsole::silent())
        .unwrap_err();

    assert!(err.is_version_conflict());
    assert_eq!(pipeline.store().inner.content(&abs("cfg")).unwrap(), b"y\n");
}
