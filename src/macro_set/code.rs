//! Line-based code form for macro sets
//!
//! One macro per line, written like a sed substitution:
//!
//! ```text
//! # comment
//! s/;a/\alpha/mA
//! s|([A-Za-z])(\d)|[[0]]_{[[1]]}|rmA:-1
//! ```
//!
//! The character after `s` is the delimiter. The last field holds the option
//! flags, optionally followed by `:PRIORITY`. Pattern triggers are written as
//! their source with the `r` flag.

use super::{MacroSetError, compile_pattern};
use crate::core::macros::{Macro, MacroOptions, Replacement, Trigger};

/// Delimiters tried, in order, when serializing
const DELIMITERS: [char; 8] = ['/', '|', '#', '~', '!', '@', '%', ','];

/// Parse a macro set written in code form
pub fn parse_macro_code(source: &str) -> Result<Vec<Macro>, MacroSetError> {
    let mut macros = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        macros.push(parse_macro_line(line).map_err(|reason| MacroSetError::InvalidLine {
            line: index + 1,
            reason,
        })?);
    }

    Ok(macros)
}

/// Parse one `s<d>trigger<d>replacement<d>flags` line
fn parse_macro_line(line: &str) -> Result<Macro, String> {
    let rest = line
        .strip_prefix('s')
        .ok_or_else(|| format!("Unknown command: {}", line))?;

    let delimiter = rest
        .chars()
        .next()
        .ok_or_else(|| "Invalid macro format: expected s/trigger/replacement/".to_string())?;

    let parts: Vec<&str> = rest[delimiter.len_utf8()..].split(delimiter).collect();
    if parts.len() < 2 {
        return Err("Invalid macro format: expected s/trigger/replacement/".to_string());
    }
    if parts.len() > 3 {
        return Err(format!("Too many '{}' delimiters", delimiter));
    }

    let trigger = parts[0];
    let replacement = parts[1];
    let flags = parts.get(2).copied().unwrap_or("");

    if trigger.is_empty() {
        return Err("Trigger cannot be empty".to_string());
    }

    let (options, priority) = match flags.split_once(':') {
        Some((options, priority)) => {
            let priority: i32 = priority
                .trim()
                .parse()
                .map_err(|_| format!("Invalid priority: {}", priority))?;
            (options, priority)
        }
        None => (flags, 0),
    };

    let options = MacroOptions::parse(options);
    let trigger = if options.regex {
        Trigger::Pattern(compile_pattern(trigger).map_err(|e| e.to_string())?)
    } else {
        Trigger::Literal(trigger.to_string())
    };

    Ok(Macro {
        trigger,
        replacement: Replacement::Template(replacement.to_string()),
        options,
        priority,
        id: None,
    })
}

/// Serialize macros to code form
pub fn serialize_macro_code(macros: &[Macro]) -> Result<String, MacroSetError> {
    let mut out = String::new();

    for (index, mac) in macros.iter().enumerate() {
        out.push_str(&serialize_macro_line(index, mac)?);
        out.push('\n');
    }

    Ok(out)
}

fn serialize_macro_line(index: usize, mac: &Macro) -> Result<String, MacroSetError> {
    let replacement = match &mac.replacement {
        Replacement::Template(t) => t.as_str(),
        Replacement::Generator(_) => {
            return Err(MacroSetError::Unserializable {
                index,
                reason: "generator replacements have no text form",
            });
        }
    };

    let mut flags = mac.options.as_str().to_string();
    if matches!(mac.trigger, Trigger::Pattern(_)) && !mac.options.regex {
        flags.insert(0, 'r');
    }

    let trigger = mac.trigger.source();
    if trigger.contains('\n') || replacement.contains('\n') || flags.contains('\n') {
        return Err(MacroSetError::Unserializable {
            index,
            reason: "line breaks cannot be written in code form",
        });
    }
    let delimiter = DELIMITERS
        .iter()
        .copied()
        .find(|d| !trigger.contains(*d) && !replacement.contains(*d) && !flags.contains(*d))
        .ok_or(MacroSetError::Unserializable {
            index,
            reason: "no free delimiter",
        })?;

    let mut line = format!("s{d}{}{d}{}{d}{}", trigger, replacement, flags, d = delimiter);
    if mac.priority != 0 {
        line.push_str(&format!(":{}", mac.priority));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_parse_basic() {
        let Ok(macros) = parse_macro_code(r"s/;a/\alpha/mA") else {
            panic!("Expected valid parse");
        };
        assert_eq!(macros.len(), 1);
        assert_eq!(macros[0].trigger.source(), ";a");
        assert!(macros[0].options.math);
        assert_eq!(macros[0].priority, 0);
    }

    #[test]
    fn test_parse_without_flags() {
        let Ok(macros) = parse_macro_code("s/->/\\to") else {
            panic!("Expected valid parse");
        };
        assert_eq!(macros[0].options.as_str(), "");
    }

    #[test]
    fn test_parse_custom_delimiter_and_priority() {
        let Ok(macros) = parse_macro_code(r"s|(\d+)/|\frac{[[0]]}{$1}$0|rm:3") else {
            panic!("Expected valid parse");
        };
        let mac = &macros[0];
        assert_eq!(mac.trigger.source(), r"(\d+)/");
        assert!(matches!(mac.trigger, Trigger::Pattern(_)));
        assert!(mac.options.regex);
        assert_eq!(mac.priority, 3);
        assert!(matches!(&mac.replacement, Replacement::Template(t) if t == r"\frac{[[0]]}{$1}$0"));
    }

    #[test]
    fn test_skips_comments_and_blanks() {
        let source = "# greek\n\ns/;b/\\beta/m\n   \n# end\n";
        let Ok(macros) = parse_macro_code(source) else {
            panic!("Expected valid parse");
        };
        assert_eq!(macros.len(), 1);
    }

    #[test]
    fn test_errors_report_line_numbers() {
        let source = "s/;a/\\alpha/m\nx/bad/line/\n";
        match parse_macro_code(source) {
            Err(MacroSetError::InvalidLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected InvalidLine, got {:?}", other.map(|m| m.len())),
        }
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(parse_macro_code("s").is_err());
        assert!(parse_macro_code("s/onlytrigger").is_err());
        assert!(parse_macro_code("s//x/").is_err());
        assert!(parse_macro_code("s/a/b/c/d").is_err());
        assert!(parse_macro_code("s/a/b/m:high").is_err());
        assert!(parse_macro_code("s/(a/b/r").is_err());
    }

    #[test]
    fn test_serialize_picks_free_delimiter() {
        let macros = vec![
            Macro::new(";a", r"\alpha").with_options("mA"),
            Macro::new("/f", r"\frac{$1}{$2}$0").with_priority(-2),
        ];
        let Ok(code) = serialize_macro_code(&macros) else {
            panic!("Expected serializable macros");
        };
        assert_eq!(code, "s/;a/\\alpha/mA\ns|/f|\\frac{$1}{$2}$0|:-2\n");
    }

    #[test]
    fn test_pattern_trigger_serializes_with_r_flag() {
        let macros = vec![Macro::new(Regex::new(r"(\d)x").unwrap(), "[[0]]").with_options("m")];
        let Ok(code) = serialize_macro_code(&macros) else {
            panic!("Expected serializable macros");
        };
        assert_eq!(code, "s/(\\d)x/[[0]]/rm\n");

        let Ok(reparsed) = parse_macro_code(&code) else {
            panic!("Expected reparse");
        };
        assert!(reparsed[0].options.regex);
        assert_eq!(reparsed[0].trigger.source(), r"(\d)x");
    }

    #[test]
    fn test_multiline_replacement_is_unserializable() {
        let macros = vec![Macro::new("dm", "$$\n$0\n$$")];
        assert!(matches!(
            serialize_macro_code(&macros),
            Err(MacroSetError::Unserializable { index: 0, .. })
        ));
    }
}
