//! Observability subsystem
//!
//! Provides:
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Scope-based begin/complete tracing
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No background threads
//! 4. The logger is passed explicitly; there is no global verbosity switch
//!
//! # Usage
//!
//! ```ignore
//! use nodeguard::observability::{log_event, Event, Logger, ObservationScope};
//!
//! let logger = Logger::for_verbosity(true);
//! log_event(&logger, Event::NodeRead, &[("path", "/dcos-service-x/a")]);
//!
//! let scope = ObservationScope::new(&logger, "PUT");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{LogCapture, Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Severity an event is logged at
pub fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_detail() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event with fields
pub fn log_event(logger: &Logger, event: Event, fields: &[(&str, &str)]) {
    logger.log(event_severity(event), event.as_str(), fields);
}
