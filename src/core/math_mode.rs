//! Math-mode detection
//!
//! Heuristic: the cursor is inside inline math when an odd number of
//! unescaped `$` precede it. Display math, comments and verbatim regions
//! are not understood.

use super::utf8::clamp_to_boundary;

/// Whether `cursor` (a byte offset) sits inside an open `$...$` region
pub fn is_inside_math(text: &str, cursor: usize) -> bool {
    let end = clamp_to_boundary(text, cursor);
    let mut dollars = 0usize;
    let mut escaped = false;

    for c in text[..end].chars() {
        if c == '\\' {
            escaped = !escaped;
        } else {
            if c == '$' && !escaped {
                dollars += 1;
            }
            escaped = false;
        }
    }

    dollars % 2 == 1
}
