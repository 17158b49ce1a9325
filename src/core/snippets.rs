//! Replacement Compiler
//!
//! Turns a macro replacement into clean text plus caret and tab-stop offsets.
//!
//! Template syntax:
//! - `${VISUAL}` is replaced with the selected text
//! - `[[k]]` is replaced with capture `k`
//! - `\$`, `\}` and `\\` emit the escaped character; any other `\x` is kept as is
//! - `$n` marks tab stop `n`, `${n:default}` marks it and inserts `default`
//! - `$0` marks the final exit position
//!
//! All offsets are byte offsets relative to the start of the clean text.

use std::collections::BTreeMap;

use super::macros::{GENERATOR_ERROR_TEXT, Macro, Replacement, VISUAL_TOKEN};

/// Output of compiling one replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroResult {
    /// Replacement text with all markers removed
    pub text: String,
    /// Where the caret goes first
    pub new_cursor: usize,
    /// Remaining stops in navigation order, `new_cursor` excluded
    pub tab_stops: Vec<usize>,
}

/// Compile a macro's replacement against the given captures and visual content
pub fn compile(mac: &Macro, captures: &[String], visual: &str) -> MacroResult {
    let raw = resolve_raw(&mac.replacement, captures, visual);
    expand_markers(&raw)
}

/// Resolve generator output or template substitutions, before marker parsing
fn resolve_raw(replacement: &Replacement, captures: &[String], visual: &str) -> String {
    match replacement {
        Replacement::Generator(generator) => match generator.call(captures) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Macro generator failed: {}", e);
                GENERATOR_ERROR_TEXT.to_string()
            }
        },
        Replacement::Template(template) => {
            let mut raw = template.replace(VISUAL_TOKEN, visual);
            for (index, capture) in captures.iter().enumerate() {
                raw = raw.replace(&format!("[[{}]]", index), capture);
            }
            raw
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Literal,
    /// A backslash was consumed
    EscapePending,
    /// Positioned on a `$` that may open a marker
    MarkerPending,
}

#[derive(Debug, PartialEq, Eq)]
enum Marker<'a> {
    /// `${n:default}`
    Placeholder { id: u64, default: &'a str },
    /// `$n`
    Bare(u64),
}

/// Scan resolved text for escapes and tab-stop markers
pub fn expand_markers(raw: &str) -> MacroResult {
    let mut clean = String::with_capacity(raw.len());
    let mut stops: BTreeMap<u64, usize> = BTreeMap::new();
    let mut exit: Option<usize> = None;
    let mut state = ScanState::Literal;
    let mut i = 0;

    while let Some(c) = raw[i..].chars().next() {
        match state {
            ScanState::Literal => match c {
                '\\' => {
                    state = ScanState::EscapePending;
                    i += 1;
                }
                '$' => state = ScanState::MarkerPending,
                _ => {
                    clean.push(c);
                    i += c.len_utf8();
                }
            },
            ScanState::EscapePending => {
                if matches!(c, '$' | '}' | '\\') {
                    clean.push(c);
                    i += 1;
                } else {
                    // Ordinary LaTeX command: keep the backslash, rescan `c`
                    clean.push('\\');
                }
                state = ScanState::Literal;
            }
            ScanState::MarkerPending => {
                match parse_marker(&raw[i..]) {
                    Some((Marker::Placeholder { id, default }, len)) => {
                        stops.insert(id, clean.len());
                        clean.push_str(default);
                        i += len;
                    }
                    Some((Marker::Bare(0), len)) => {
                        exit = Some(clean.len());
                        i += len;
                    }
                    Some((Marker::Bare(id), len)) => {
                        stops.insert(id, clean.len());
                        i += len;
                    }
                    None => {
                        clean.push('$');
                        i += 1;
                    }
                }
                state = ScanState::Literal;
            }
        }
    }

    if state == ScanState::EscapePending {
        clean.push('\\');
    }

    let exit = exit.unwrap_or(clean.len());
    let mut ordered = stops.into_values();

    match ordered.next() {
        Some(first) => {
            let mut tab_stops: Vec<usize> = ordered.collect();
            tab_stops.push(exit);
            MacroResult {
                text: clean,
                new_cursor: first,
                tab_stops,
            }
        }
        None => MacroResult {
            text: clean,
            new_cursor: exit,
            tab_stops: Vec::new(),
        },
    }
}

/// Parse a marker at the start of `s` (which starts with `$`).
/// Returns the marker and its length in bytes.
fn parse_marker(s: &str) -> Option<(Marker<'_>, usize)> {
    let body = s.strip_prefix('$')?;

    if let Some(inner) = body.strip_prefix('{') {
        let digits = leading_digits(inner);
        if digits.is_empty() {
            return None;
        }
        let rest = inner[digits.len()..].strip_prefix(':')?;
        let close = rest.find('}')?;
        if close == 0 {
            return None;
        }
        let default = &rest[..close];
        // `$` `{` digits `:` default `}`
        let len = 2 + digits.len() + 1 + default.len() + 1;
        return Some((
            Marker::Placeholder {
                id: parse_id(digits),
                default,
            },
            len,
        ));
    }

    let digits = leading_digits(body);
    if digits.is_empty() {
        return None;
    }
    Some((Marker::Bare(parse_id(digits)), 1 + digits.len()))
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    &s[..end]
}

fn parse_id(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::macros::{Generator, GeneratorError};

    fn template(t: &str) -> Macro {
        Macro::new("x", t)
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let result = expand_markers("a + b = c");
        assert_eq!(result.text, "a + b = c");
        assert_eq!(result.new_cursor, result.text.len());
        assert!(result.tab_stops.is_empty());
    }

    #[test]
    fn test_escapes() {
        let result = expand_markers(r"\$ \} \\ \alpha");
        assert_eq!(result.text, r"$ } \ \alpha");
        assert!(result.tab_stops.is_empty());
    }

    #[test]
    fn test_escaped_dollar_is_not_a_marker() {
        let result = expand_markers(r"\$1");
        assert_eq!(result.text, "$1");
        assert_eq!(result.new_cursor, 2);
        assert!(result.tab_stops.is_empty());
    }

    #[test]
    fn test_trailing_backslash() {
        assert_eq!(expand_markers("a\\").text, "a\\");
    }

    #[test]
    fn test_frac_stops() {
        let result = expand_markers(r"\frac{$1}{$2}$0");
        assert_eq!(result.text, r"\frac{}{}");
        assert_eq!(result.new_cursor, 6);
        assert_eq!(result.tab_stops, vec![8, 9]);
    }

    #[test]
    fn test_stops_follow_numeric_order() {
        let result = expand_markers("a$2b$1c");
        assert_eq!(result.text, "abc");
        assert_eq!(result.new_cursor, 2);
        assert_eq!(result.tab_stops, vec![1, 3]);
    }

    #[test]
    fn test_placeholder_defaults() {
        let result = expand_markers(r"\sum_{${1:i}}^{${2:n}}");
        assert_eq!(result.text, r"\sum_{i}^{n}");
        assert_eq!(result.new_cursor, 6);
        assert_eq!(result.tab_stops, vec![10, 12]);
    }

    #[test]
    fn test_bare_zero_only() {
        let result = expand_markers("ab$0cd");
        assert_eq!(result.text, "abcd");
        assert_eq!(result.new_cursor, 2);
        assert!(result.tab_stops.is_empty());
    }

    #[test]
    fn test_placeholder_zero_is_a_numbered_stop() {
        let result = expand_markers("${0:x}y$1");
        assert_eq!(result.text, "xy");
        // stop 0 sorts before stop 1, and the exit defaults to the end
        assert_eq!(result.new_cursor, 0);
        assert_eq!(result.tab_stops, vec![2, 2]);
    }

    #[test]
    fn test_malformed_markers_are_literal() {
        assert_eq!(expand_markers("${1:}").text, "${1:}");
        assert_eq!(expand_markers("${a:b}").text, "${a:b}");
        assert_eq!(expand_markers("$x").text, "$x");
        assert_eq!(expand_markers("${1:open").text, "${1:open");
        assert_eq!(expand_markers("$").text, "$");
    }

    #[test]
    fn test_duplicate_stop_keeps_last_position() {
        let result = expand_markers("$1a$1");
        assert_eq!(result.new_cursor, 1);
        assert_eq!(result.tab_stops, vec![1]);
    }

    #[test]
    fn test_multi_digit_ids() {
        let result = expand_markers("$10a$2");
        assert_eq!(result.new_cursor, 1);
        assert_eq!(result.tab_stops, vec![0, 1]);
    }

    #[test]
    fn test_captures_and_visual() {
        let mac = template(r"\underbrace{${VISUAL}}_{[[0]]}$0");
        let result = compile(&mac, &["n".to_string()], "a+b");
        assert_eq!(result.text, r"\underbrace{a+b}_{n}");
        assert_eq!(result.new_cursor, result.text.len());
    }

    #[test]
    fn test_missing_capture_left_literal() {
        let mac = template("[[0]]_[[1]]");
        let result = compile(&mac, &["x".to_string()], "");
        assert_eq!(result.text, "x_[[1]]");
    }

    #[test]
    fn test_generator_output_is_scanned() {
        let mac = Macro::new(
            "x",
            Generator::new(|caps| Ok(format!("{}^{{$1}}$0", caps.join("")))),
        );
        let result = compile(&mac, &["e".to_string()], "");
        assert_eq!(result.text, "e^{}");
        assert_eq!(result.new_cursor, 3);
        assert_eq!(result.tab_stops, vec![4]);
    }

    #[test]
    fn test_generator_failure_yields_error_text() {
        let mac = Macro::new(
            "x",
            Generator::new(|_| Err(GeneratorError("boom".to_string()))),
        );
        let result = compile(&mac, &[], "");
        assert_eq!(result.text, "ERROR");
        assert_eq!(result.new_cursor, 5);
    }

    #[test]
    fn test_unicode_offsets_are_bytes() {
        let result = expand_markers("α$1β");
        assert_eq!(result.text, "αβ");
        assert_eq!(result.new_cursor, 2);
        assert_eq!(result.tab_stops, vec![4]);
    }
}
