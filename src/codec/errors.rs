//! # Codec Errors

use thiserror::Error;

use super::SchemaId;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Structured-message conversion errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Wire bytes are not a valid encoding of the schema
    #[error("Unable to decode {schema}: {reason}")]
    Decode { schema: SchemaId, reason: String },

    /// Editable text does not parse as the schema
    #[error("Unable to parse {schema} text: {reason}")]
    Text { schema: SchemaId, reason: String },

    /// A required field is unset
    #[error("{schema} is missing required field '{field}'")]
    MissingRequired { schema: SchemaId, field: String },

    /// Message cannot be serialized under the schema
    #[error("Unable to encode {schema}: {reason}")]
    Encode { schema: SchemaId, reason: String },

    /// Message cannot be rendered as editable text
    #[error("Unable to render {schema} as text: {reason}")]
    Render { schema: SchemaId, reason: String },

    /// Stored wire bytes carry fields outside the modelled schema
    #[error(
        "Stored {schema} ({stored} bytes) has fields this tool does not model; re-encoding gives {reencoded} bytes and would drop them. Delete the node first to replace it."
    )]
    Lossy {
        schema: SchemaId,
        stored: usize,
        reencoded: usize,
    },

    /// No candidate schema accepted the input
    #[error("Unable to parse provided data ({len} bytes) as any known structured message{details}")]
    NoMatchingSchema { len: usize, details: String },

    /// Two candidate schemas accept the same content
    #[error("Candidate schemas {first} and {second} both accept the same content; the schema set is ambiguous")]
    AmbiguousSchemas { first: SchemaId, second: SchemaId },

    /// A schema appears twice in the candidate list
    #[error("Schema {0} is listed more than once")]
    DuplicateSchema(SchemaId),
}

impl CodecError {
    /// Summarize per-schema failures for a `NoMatchingSchema` error
    pub fn no_match(len: usize, attempts: &[(SchemaId, CodecError)]) -> Self {
        let details = attempts
            .iter()
            .map(|(schema, err)| format!("\n  {}: {}", schema, err))
            .collect::<String>();
        CodecError::NoMatchingSchema {
            len,
            details: if details.is_empty() {
                String::new()
            } else {
                format!(":{}", details)
            },
        }
    }
}
