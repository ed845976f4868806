//! Payload format classification and conversion
//!
//! A node's payload is one of three formats. The format is never stored;
//! it is inferred from the bytes every time they are read.

mod convert;
mod detect;
mod hexdump;

pub use convert::{editable_text, to_export, to_wire};
pub use detect::FormatDetector;
pub use hexdump::hex_dump;

use std::fmt;

/// Encoding of a node payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Wire bytes of a known structured message
    StructuredMessage,
    /// Anything containing non-printable bytes
    Binary,
    /// Printable ASCII plus tab and line breaks
    Text,
}

impl Format {
    /// Spelling used on the command line and in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::StructuredMessage => "proto",
            Format::Binary => "binary",
            Format::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format requested by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestedFormat {
    /// Infer from content
    #[default]
    Auto,
    Fixed(Format),
}

impl fmt::Display for RequestedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedFormat::Auto => f.write_str("auto"),
            RequestedFormat::Fixed(format) => format.fmt(f),
        }
    }
}

impl From<Format> for RequestedFormat {
    fn from(format: Format) -> Self {
        RequestedFormat::Fixed(format)
    }
}
