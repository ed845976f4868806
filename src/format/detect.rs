//! Format detection
//!
//! Order matters: structured message, then binary, then text. Empty
//! content is text.

use crate::codec::MessageCodec;
use crate::observability::{log_event, Event, Logger};

use super::{Format, RequestedFormat};

/// Classifies payloads against a codec's candidate schemas
pub struct FormatDetector<'a> {
    codec: &'a MessageCodec,
    logger: &'a Logger,
}

impl<'a> FormatDetector<'a> {
    pub fn new(codec: &'a MessageCodec, logger: &'a Logger) -> Self {
        Self { codec, logger }
    }

    /// Classify stored (wire) content
    pub fn detect(&self, content: &[u8]) -> Format {
        let format = match self.codec.decode_any(content) {
            Some(message) => {
                log_event(
                    self.logger,
                    Event::SchemaMatched,
                    &[("schema", message.schema().as_str())],
                );
                Format::StructuredMessage
            }
            None if is_printable(content) => Format::Text,
            None => Format::Binary,
        };
        self.log_detected(format, content.len(), "wire");
        format
    }

    /// Classify operator-supplied content
    ///
    /// Editable JSON of a candidate schema counts as a structured message.
    pub fn detect_local(&self, content: &[u8]) -> Format {
        if let Some(message) = self.codec.from_editable_text(content) {
            log_event(
                self.logger,
                Event::SchemaMatched,
                &[("schema", message.schema().as_str())],
            );
            self.log_detected(Format::StructuredMessage, content.len(), "local");
            return Format::StructuredMessage;
        }
        self.detect(content)
    }

    /// Requested format for stored content, detecting when `Auto`
    pub fn resolve(&self, content: &[u8], requested: RequestedFormat) -> Format {
        match requested {
            RequestedFormat::Fixed(format) => format,
            RequestedFormat::Auto => self.detect(content),
        }
    }

    /// Requested format for local content, detecting when `Auto`
    pub fn resolve_local(&self, content: &[u8], requested: RequestedFormat) -> Format {
        match requested {
            RequestedFormat::Fixed(format) => format,
            RequestedFormat::Auto => self.detect_local(content),
        }
    }

    fn log_detected(&self, format: Format, len: usize, origin: &str) {
        let len = len.to_string();
        log_event(
            self.logger,
            Event::FormatDetected,
            &[("bytes", len.as_str()), ("format", format.as_str()), ("origin", origin)],
        );
    }
}

/// Printable ASCII plus `\t`, `\n`, `\r`
pub fn is_printable(content: &[u8]) -> bool {
    content
        .iter()
        .all(|&b| (0x20..=0x7e).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'))
}
