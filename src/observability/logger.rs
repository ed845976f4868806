//! Structured JSON logger
//!
//! - One log line = one event
//! - Deterministic key ordering
//! - Explicit severity threshold, no process-wide state
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable, invocation ends
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone)]
enum Sink {
    Stderr,
    Buffer(Arc<Mutex<Vec<u8>>>),
    Null,
}

/// Handle on lines written through a capturing logger
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// All captured output
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Captured lines, one per event
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Whether an event with this name was logged
    pub fn has_event(&self, event: &str) -> bool {
        let needle = format!("{{\"event\":\"{}\"", event);
        self.lines().iter().any(|l| l.starts_with(&needle))
    }
}

/// A structured logger that outputs JSON lines
///
/// Cloned into every component that logs. Lines below the threshold are
/// dropped before any formatting happens.
#[derive(Clone)]
pub struct Logger {
    threshold: Severity,
    sink: Sink,
}

impl Logger {
    /// Logger writing to stderr at or above `threshold`
    pub fn stderr(threshold: Severity) -> Self {
        Self {
            threshold,
            sink: Sink::Stderr,
        }
    }

    /// `--verbose` shows everything, otherwise only warnings and worse
    pub fn for_verbosity(verbose: bool) -> Self {
        Self::stderr(if verbose { Severity::Trace } else { Severity::Warn })
    }

    /// Logger that drops every line
    pub fn disabled() -> Self {
        Self {
            threshold: Severity::Fatal,
            sink: Sink::Null,
        }
    }

    /// Logger that keeps every line in memory
    pub fn capture() -> (Self, LogCapture) {
        let capture = LogCapture::default();
        let logger = Self {
            threshold: Severity::Trace,
            sink: Sink::Buffer(Arc::clone(&capture.buffer)),
        };
        (logger, capture)
    }

    /// Whether a line at `severity` would be written
    pub fn enabled(&self, severity: Severity) -> bool {
        !matches!(self.sink, Sink::Null) && severity >= self.threshold
    }

    /// Log an event with the given severity and fields
    ///
    /// Fields are output in deterministic order (alphabetical by key)
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !self.enabled(severity) {
            return;
        }
        let line = Self::format_line(severity, event, fields);
        match &self.sink {
            Sink::Stderr => {
                let mut stderr = io::stderr().lock();
                let _ = stderr.write_all(line.as_bytes());
                let _ = stderr.flush();
            }
            Sink::Buffer(buffer) => {
                let mut buffer = buffer.lock().unwrap_or_else(|p| p.into_inner());
                buffer.extend_from_slice(line.as_bytes());
            }
            Sink::Null => {}
        }
    }

    fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(256);

        output.push('{');

        // Always output event first
        output.push_str("\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push('"');

        output.push_str(",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push('}');
        output.push('\n');
        output
    }

    /// Escape special characters for JSON strings
    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }

    /// Log at TRACE level
    pub fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }

    /// Log at FATAL level
    pub fn fatal(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Fatal, event, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            Sink::Stderr => "stderr",
            Sink::Buffer(_) => "buffer",
            Sink::Null => "null",
        };
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("sink", &sink)
            .finish()
    }
}
