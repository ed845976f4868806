//! Diff rendering for proposed node changes
//!
//! Both sides are rendered to their editable representation in the same
//! format, then compared line by line (LCS). Every line is printed, with
//! `- `, `+ `, or two spaces in front.

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::codec::{CodecResult, MessageCodec};
use crate::format::{editable_text, Format};

/// Renders the change a put would make
pub struct DiffRenderer<'a> {
    codec: &'a MessageCodec,
}

impl<'a> DiffRenderer<'a> {
    pub fn new(codec: &'a MessageCodec) -> Self {
        Self { codec }
    }

    /// Describe replacing `old` (absent for a new node) with `new` at `path`
    pub fn render(&self, path: &str, old: Option<&[u8]>, new: &[u8], format: Format) -> CodecResult<String> {
        let new_text = editable_text(self.codec, new, format)?;
        match old {
            None => Ok(format!(
                "New node {} ({} bytes):\n{}",
                path,
                new.len(),
                new_text
            )),
            Some(old) => {
                let old_text = editable_text(self.codec, old, format)?;
                Ok(format!(
                    "Changes to {} ({} bytes -> {} bytes):\n{}",
                    path,
                    old.len(),
                    new.len(),
                    line_diff(&old_text, &new_text)
                ))
            }
        }
    }
}

/// Full line diff of two texts, one output line per input line
pub fn line_diff(old: &str, new: &str) -> String {
    // a trailing '\r' stays part of its line
    let old_lines: Vec<&str> = old.split_terminator('\n').collect();
    let new_lines: Vec<&str> = new.split_terminator('\n').collect();

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_slices(&old_lines, &new_lines);

    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let prefix = match change.tag() {
            ChangeTag::Delete => "- ",
            ChangeTag::Insert => "+ ",
            ChangeTag::Equal => "  ",
        };
        out.push_str(prefix);
        out.push_str(change.value());
        out.push('\n');
    }
    out
}
