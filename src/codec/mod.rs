//! Structured-message codec
//!
//! Converts node payloads between protobuf wire bytes and an editable JSON
//! form by trying an ordered list of candidate schemas.
//!
//! # Design Principles
//!
//! - First match wins, in list order
//! - A match requires a clean decode AND every required field present
//! - The candidate set is checked for overlap once, at construction
//! - No match is not an error; callers fall back to binary or text

mod enums;
mod errors;
pub mod mesos;
mod schema;

pub use enums::NamedEnum;
pub use errors::{CodecError, CodecResult};
pub use schema::{CandidateMessage, DecodedMessage, SchemaEntry, SchemaId};

use std::collections::HashSet;

use mesos::{TaskInfo, TaskStatus};

/// Ordered set of candidate schemas
#[derive(Debug, Clone)]
pub struct MessageCodec {
    schemas: Vec<SchemaEntry>,
}

impl MessageCodec {
    /// Build a codec over `schemas`, tried in the given order
    ///
    /// Fails when a schema is listed twice, or when the sample of one
    /// schema is accepted by another (wire or text form).
    pub fn new(schemas: Vec<SchemaEntry>) -> CodecResult<Self> {
        let mut seen = HashSet::new();
        for entry in &schemas {
            if !seen.insert(entry.id) {
                return Err(CodecError::DuplicateSchema(entry.id));
            }
        }

        for entry in &schemas {
            let sample = (entry.sample)();
            let wire = sample.encode_to_vec();
            let text = sample.to_json_pretty().map_err(|e| CodecError::Render {
                schema: entry.id,
                reason: e.to_string(),
            })?;

            for other in schemas.iter().filter(|o| o.id != entry.id) {
                if (other.decode)(&wire).is_ok() || (other.parse_text)(&text).is_ok() {
                    return Err(CodecError::AmbiguousSchemas {
                        first: entry.id,
                        second: other.id,
                    });
                }
            }
        }

        Ok(Self { schemas })
    }

    /// The Mesos task schemas: `TaskInfo`, then `TaskStatus`
    pub fn mesos() -> CodecResult<Self> {
        Self::new(vec![
            SchemaEntry::of::<TaskInfo>(),
            SchemaEntry::of::<TaskStatus>(),
        ])
    }

    /// Schema ids in priority order
    pub fn schema_ids(&self) -> Vec<SchemaId> {
        self.schemas.iter().map(|s| s.id).collect()
    }

    /// Decode wire bytes under the first schema that accepts them
    pub fn decode_any(&self, raw: &[u8]) -> Option<DecodedMessage> {
        self.decode_attempts(raw).ok()
    }

    /// Like `decode_any`, but keeps each schema's rejection reason
    pub fn decode_attempts(&self, raw: &[u8]) -> Result<DecodedMessage, Vec<(SchemaId, CodecError)>> {
        let mut failures = Vec::with_capacity(self.schemas.len());
        for entry in &self.schemas {
            match (entry.decode)(raw) {
                Ok(message) => return Ok(message),
                Err(e) => failures.push((entry.id, e)),
            }
        }
        Err(failures)
    }

    /// Serialize `message` as `schema`
    pub fn encode(&self, schema: SchemaId, message: &DecodedMessage) -> CodecResult<Vec<u8>> {
        if message.schema() != schema {
            return Err(CodecError::Encode {
                schema,
                reason: format!("message is a {}", message.schema()),
            });
        }
        if let Some(field) = message.missing_field() {
            return Err(CodecError::MissingRequired { schema, field });
        }
        Ok(message.encode_to_vec())
    }

    /// Canonical JSON with a trailing newline
    pub fn to_editable_text(&self, message: &DecodedMessage) -> CodecResult<String> {
        let mut text = message.to_json_pretty().map_err(|e| CodecError::Render {
            schema: message.schema(),
            reason: e.to_string(),
        })?;
        text.push('\n');
        Ok(text)
    }

    /// Parse editable JSON under the first schema that accepts it
    pub fn from_editable_text(&self, text: &[u8]) -> Option<DecodedMessage> {
        self.parse_text_attempts(text).ok()
    }

    /// Like `from_editable_text`, but keeps each schema's rejection reason
    pub fn parse_text_attempts(&self, text: &[u8]) -> Result<DecodedMessage, Vec<(SchemaId, CodecError)>> {
        let text = match std::str::from_utf8(text) {
            Ok(text) => text,
            Err(e) => {
                return Err(self
                    .schemas
                    .iter()
                    .map(|entry| {
                        (
                            entry.id,
                            CodecError::Text {
                                schema: entry.id,
                                reason: e.to_string(),
                            },
                        )
                    })
                    .collect())
            }
        };

        let mut failures = Vec::with_capacity(self.schemas.len());
        for entry in &self.schemas {
            match (entry.parse_text)(text) {
                Ok(message) => return Ok(message),
                Err(e) => failures.push((entry.id, e)),
            }
        }
        Err(failures)
    }

    /// Whether re-encoding `message` reproduces `raw` exactly
    ///
    /// False when the payload carried fields outside the known subset.
    pub fn is_lossless(&self, raw: &[u8], message: &DecodedMessage) -> bool {
        message.encode_to_vec() == raw
    }

    /// Fails with [`CodecError::Lossy`] unless `raw` decodes and re-encodes
    /// to exactly the same bytes
    ///
    /// Content that matches no schema is left to the caller.
    pub fn ensure_lossless(&self, raw: &[u8]) -> CodecResult<()> {
        let message = match self.decode_any(raw) {
            Some(message) => message,
            None => return Ok(()),
        };
        let reencoded = message.encode_to_vec();
        if reencoded == raw {
            return Ok(());
        }
        Err(CodecError::Lossy {
            schema: message.schema(),
            stored: raw.len(),
            reencoded: reencoded.len(),
        })
    }
}
