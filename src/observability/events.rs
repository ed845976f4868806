//! Observability events
//!
//! Every lifecycle point of a node operation has an explicit, typed event.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration and session
    /// Configuration resolved
    ConfigLoaded,
    /// Store session established
    StoreConnected,
    /// Store session state changed
    StoreSessionEvent,

    // Reads
    /// Node content fetched
    NodeRead,
    /// Node did not exist
    NodeAbsent,
    /// Format classified
    FormatDetected,
    /// Structured message schema matched
    SchemaMatched,
    /// Pipeline entered a new stage
    StageEntered,

    // Mutation
    /// Diff rendered for confirmation
    DiffRendered,
    /// Requested content equals stored content
    NoChange,
    /// Operator declined the confirmation prompt
    ConfirmDeclined,
    /// Backup file written
    BackupWritten,
    /// Old backup files removed
    BackupPruned,
    /// Existing node overwritten
    NodeWritten,
    /// New node created
    NodeCreated,
    /// Node removed
    NodeDeleted,
    /// Stored message carries fields outside the known schema
    LossyContent,
    /// Store rejected a conditional write (FATAL)
    VersionConflict,

    // Listing
    /// Recursive listing stopped at the depth cap
    ListingTruncated,
}

impl Event {
    /// Returns the event name as written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreConnected => "STORE_CONNECTED",
            Event::StoreSessionEvent => "STORE_SESSION_EVENT",
            Event::NodeRead => "NODE_READ",
            Event::NodeAbsent => "NODE_ABSENT",
            Event::FormatDetected => "FORMAT_DETECTED",
            Event::SchemaMatched => "SCHEMA_MATCHED",
            Event::StageEntered => "STAGE_ENTERED",
            Event::DiffRendered => "DIFF_RENDERED",
            Event::NoChange => "NO_CHANGE",
            Event::ConfirmDeclined => "CONFIRM_DECLINED",
            Event::BackupWritten => "BACKUP_WRITTEN",
            Event::BackupPruned => "BACKUP_PRUNED",
            Event::NodeWritten => "NODE_WRITTEN",
            Event::NodeCreated => "NODE_CREATED",
            Event::NodeDeleted => "NODE_DELETED",
            Event::LossyContent => "LOSSY_CONTENT",
            Event::VersionConflict => "VERSION_CONFLICT",
            Event::ListingTruncated => "LISTING_TRUNCATED",
        }
    }

    /// Returns true if this event ends the invocation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::VersionConflict)
    }

    /// Returns true for high-volume detail events
    pub fn is_detail(&self) -> bool {
        matches!(
            self,
            Event::StageEntered
                | Event::FormatDetected
                | Event::SchemaMatched
                | Event::StoreSessionEvent
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
