//! Terminal display width helpers.
//!
//! Element names may carry ANSI styling when they come from a styled
//! toolkit dump, so widths are measured after stripping escapes.

use unicode_width::UnicodeWidthChar;

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Strip ANSI escapes and cut the text so it fits in `max` display columns.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);

    let mut out = String::new();
    let mut used = 0;
    for ch in clean_str.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
