//! Trigger matching and dispatch
//!
//! Given a buffer, a cursor and a macro set, picks the single macro whose
//! trigger has just been typed and rewrites the buffer with its expansion.
//!
//! Candidate order: descending priority, then descending declaration index,
//! so among equal priorities the macro declared last wins. The first
//! candidate whose trigger matches fires; nothing after it is evaluated.

use serde::Serialize;

use super::macros::{Macro, Pattern, Replacement, Trigger};
use super::math_mode::is_inside_math;
use super::snippets::{MacroResult, compile};
use super::utf8::{byte_to_utf16, clamp_to_boundary};

/// A rewritten buffer with absolute caret and tab-stop offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub text: String,
    pub cursor_index: usize,
    pub tab_stops: Vec<usize>,
}

impl Expansion {
    /// Same expansion with offsets counted in UTF-16 code units
    pub fn to_utf16(&self) -> Expansion {
        Expansion {
            text: self.text.clone(),
            cursor_index: byte_to_utf16(&self.text, self.cursor_index),
            tab_stops: self
                .tab_stops
                .iter()
                .map(|&stop| byte_to_utf16(&self.text, stop))
                .collect(),
        }
    }
}

/// Where a trigger matched in the text before the cursor
#[derive(Debug)]
struct TriggerMatch {
    /// Byte offset where the consumed span starts
    start: usize,
    captures: Vec<String>,
}

/// Check the macro set against the text just typed.
///
/// `cursor` is a byte offset; `force_math` treats the cursor as inside math
/// regardless of the surrounding `$` delimiters. Returns `None` when no macro
/// fires.
pub fn match_macros(
    text: &str,
    cursor: usize,
    macros: &[Macro],
    force_math: bool,
) -> Option<Expansion> {
    let cursor = clamp_to_boundary(text, cursor);
    let (before, after) = text.split_at(cursor);
    let in_math = force_math || is_inside_math(text, cursor);

    let mut candidates: Vec<(usize, &Macro)> = macros
        .iter()
        .enumerate()
        .filter(|(_, m)| m.options.applies_in(in_math) && !m.replacement.is_visual())
        .collect();

    candidates.sort_by(|(index_a, a), (index_b, b)| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| index_b.cmp(index_a))
    });

    for (index, mac) in candidates {
        let found = match find_trigger(mac, before) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    "Pattern trigger {:?} (macro #{}) failed: {}",
                    mac.trigger.source(),
                    index,
                    e
                );
                continue;
            }
        };

        if let Some(m) = found {
            tracing::debug!(
                "Macro #{} fired on {:?} (in_math={})",
                index,
                &before[m.start..],
                in_math
            );
            let result = compile(mac, &m.captures, "");
            return Some(splice(&before[..m.start], result, after));
        }
    }

    tracing::trace!("No macro matched at {}", cursor);
    None
}

/// Apply a macro to a selected range, using the selection as visual content.
///
/// The range is normalised and clamped to the text; the macro's mode flags and
/// trigger are not consulted.
pub fn expand_selection(text: &str, start: usize, end: usize, mac: &Macro) -> Expansion {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let start = clamp_to_boundary(text, start);
    let end = clamp_to_boundary(text, end);

    let result = compile(mac, &[], &text[start..end]);
    splice(&text[..start], result, &text[end..])
}

fn find_trigger(mac: &Macro, before: &str) -> Result<Option<TriggerMatch>, regex::Error> {
    match &mac.trigger {
        Trigger::Pattern(pattern) => Ok(match_pattern(pattern, &mac.replacement, before)),
        Trigger::Literal(source) if mac.options.regex => {
            // Built in code without going through a loader: compile per call
            let pattern = Pattern::new(source)?;
            Ok(match_pattern(&pattern, &mac.replacement, before))
        }
        Trigger::Literal(literal) => Ok(before.ends_with(literal.as_str()).then(|| {
            TriggerMatch {
                start: before.len() - literal.len(),
                captures: Vec::new(),
            }
        })),
    }
}

/// Match `pattern` so that it ends exactly at the end of `before`
fn match_pattern(
    pattern: &Pattern,
    replacement: &Replacement,
    before: &str,
) -> Option<TriggerMatch> {
    let caps = pattern.captures_at_end(before)?;
    let whole = caps.get(0)?;

    // Generators see the whole match at index 0, templates only the groups
    let skip = match replacement {
        Replacement::Generator(_) => 0,
        Replacement::Template(_) => 1,
    };
    let captures = caps
        .iter()
        .skip(skip)
        .map(|group| group.map_or_else(String::new, |g| g.as_str().to_string()))
        .collect();

    Some(TriggerMatch {
        start: whole.start(),
        captures,
    })
}

fn splice(prefix: &str, result: MacroResult, suffix: &str) -> Expansion {
    let base = prefix.len();
    let mut text = String::with_capacity(prefix.len() + result.text.len() + suffix.len());
    text.push_str(prefix);
    text.push_str(&result.text);
    text.push_str(suffix);

    Expansion {
        text,
        cursor_index: base + result.new_cursor,
        tab_stops: result.tab_stops.iter().map(|stop| base + stop).collect(),
    }
}
