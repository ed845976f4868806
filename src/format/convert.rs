//! Conversions between wire, editable, and export forms

use crate::codec::{CodecError, CodecResult, MessageCodec};

use super::{hex_dump, Format};

/// Editable representation of stored content in `format`
///
/// Structured messages become canonical JSON, binary becomes a hex dump,
/// and text gains a trailing line break when it lacks one.
pub fn editable_text(codec: &MessageCodec, content: &[u8], format: Format) -> CodecResult<String> {
    match format {
        Format::StructuredMessage => {
            let message = codec
                .decode_attempts(content)
                .map_err(|failures| CodecError::no_match(content.len(), &failures))?;
            codec.to_editable_text(&message)
        }
        Format::Binary => Ok(hex_dump(content)),
        Format::Text => {
            let mut text = String::from_utf8_lossy(content).into_owned();
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            Ok(text)
        }
    }
}

/// Wire bytes for operator-supplied content in `format`
///
/// Structured messages are accepted as editable JSON or as wire bytes that
/// already decode cleanly.
pub fn to_wire(codec: &MessageCodec, local: &[u8], format: Format) -> CodecResult<Vec<u8>> {
    match format {
        Format::StructuredMessage => match codec.parse_text_attempts(local) {
            Ok(message) => codec.encode(message.schema(), &message),
            Err(failures) => {
                if codec.decode_any(local).is_some() {
                    Ok(local.to_vec())
                } else {
                    Err(CodecError::no_match(local.len(), &failures))
                }
            }
        },
        Format::Binary | Format::Text => Ok(local.to_vec()),
    }
}

/// Bytes written out by `get`: JSON for structured messages, raw otherwise
pub fn to_export(codec: &MessageCodec, content: &[u8], format: Format) -> CodecResult<Vec<u8>> {
    match format {
        Format::StructuredMessage => editable_text(codec, content, format).map(String::into_bytes),
        Format::Binary | Format::Text => Ok(content.to_vec()),
    }
}
