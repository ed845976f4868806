//! Canonical hex dump
//!
//! ```text
//! 00000000  68 65 6c 6c 6f 0a                                 |hello.|
//! ```

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Render `data` as 16-byte lines of offset, hex, and printable gutter
///
/// Empty input renders as an empty string.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4 + 16);

    for (index, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x}  ", index * BYTES_PER_LINE);
        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{:02x} ", byte);
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }

    out
}
