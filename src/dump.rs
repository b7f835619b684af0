//! Hex and ASCII dump of raw reports, for diagnostics.

use std::fmt::Write;

const WIDTH: usize = 16;

/// Format `buf` as rows of 16 hex bytes followed by their printable ASCII.
///
/// Bytes outside `0x20..=0x7F` are shown as `.` in the ASCII column.
///
/// ```
/// let s = corsairmi_exporter::hexdump(b"\x03\x99CORSAIR\x00");
/// assert_eq!(
///     s,
///     " 03 99 43 4f 52 53 41 49 52 00                    ..CORSAIR.\n"
/// );
/// ```
pub fn hexdump(buf: &[u8]) -> String {
    let mut out = String::with_capacity((buf.len() / WIDTH + 1) * (WIDTH * 4 + 3));
    for row in buf.chunks(WIDTH) {
        for col in 0..WIDTH {
            match row.get(col) {
                // writing into a String cannot fail
                Some(b) => {
                    let _ = write!(out, " {:02x}", b);
                }
                None => out.push_str("   "),
            }
        }
        out.push_str("  ");
        out.extend(row.iter().map(|&c| {
            if (0x20..=0x7F).contains(&c) {
                c as char
            } else {
                '.'
            }
        }));
        out.push('\n');
    }
    out
}
