//! Macro definitions
//!
//! A macro is a rewrite rule: when its trigger has just been typed, the
//! trigger text is replaced by the (compiled) replacement.

use regex::{Captures, Regex, RegexBuilder};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Placeholder substituted with the selected text in visual macros
pub const VISUAL_TOKEN: &str = "${VISUAL}";

/// Text emitted in place of a generator that failed
pub const GENERATOR_ERROR_TEXT: &str = "ERROR";

/// A compiled trigger pattern
///
/// Patterns compiled here carry an end-anchored twin built with the same
/// builder configuration. A bare [`Regex`] handed over by the caller has no
/// twin; its matches are scanned for one that ends at the cursor instead.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    /// `(?:source)\z`
    anchored: Option<Regex>,
}

impl Pattern {
    /// Compile `source` with the default configuration
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Self::build(source, |builder| builder)
    }

    /// Compile `source` with a configured builder, e.g.
    /// `Pattern::build("alpha", |b| b.case_insensitive(true))`
    pub fn build<F>(source: &str, configure: F) -> Result<Self, regex::Error>
    where
        F: Fn(&mut RegexBuilder) -> &mut RegexBuilder,
    {
        let regex = configure(&mut RegexBuilder::new(source)).build()?;
        let anchored_source = format!("(?:{})\\z", source);
        let anchored = configure(&mut RegexBuilder::new(&anchored_source)).build()?;
        Ok(Self {
            regex,
            anchored: Some(anchored),
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Captures of the leftmost match that ends exactly at the end of `haystack`
    pub fn captures_at_end<'h>(&self, haystack: &'h str) -> Option<Captures<'h>> {
        if let Some(anchored) = &self.anchored {
            return anchored.captures(haystack);
        }

        let mut start = 0;
        while start <= haystack.len() {
            let caps = self.regex.captures_at(haystack, start)?;
            let whole = caps.get(0)?;
            if whole.end() == haystack.len() {
                return Some(caps);
            }
            start = whole.start()
                + haystack[whole.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        None
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self {
            regex,
            anchored: None,
        }
    }
}

/// What has to be typed for a macro to fire
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Literal text, or a pattern source when the macro carries the `r` flag
    Literal(String),
    /// A precompiled pattern
    Pattern(Pattern),
}

impl Trigger {
    /// Source text of the trigger (the literal, or the pattern source)
    pub fn source(&self) -> &str {
        match self {
            Trigger::Literal(s) => s,
            Trigger::Pattern(p) => p.as_str(),
        }
    }
}

impl From<&str> for Trigger {
    fn from(s: &str) -> Self {
        Trigger::Literal(s.to_string())
    }
}

impl From<String> for Trigger {
    fn from(s: String) -> Self {
        Trigger::Literal(s)
    }
}

impl From<Pattern> for Trigger {
    fn from(p: Pattern) -> Self {
        Trigger::Pattern(p)
    }
}

impl From<Regex> for Trigger {
    fn from(re: Regex) -> Self {
        Trigger::Pattern(re.into())
    }
}

/// Failure reported by a generator replacement
#[derive(Debug, Clone, Error)]
#[error("generator failed: {0}")]
pub struct GeneratorError(pub String);

impl From<&str> for GeneratorError {
    fn from(s: &str) -> Self {
        GeneratorError(s.to_string())
    }
}

type GeneratorFn = dyn Fn(&[String]) -> Result<String, GeneratorError> + Send + Sync;

/// A replacement computed from the captures of a match
#[derive(Clone)]
pub struct Generator(Arc<GeneratorFn>);

impl Generator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> Result<String, GeneratorError> + Send + Sync + 'static,
    {
        Generator(Arc::new(f))
    }

    pub fn call(&self, captures: &[String]) -> Result<String, GeneratorError> {
        (self.0)(captures)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Generator(..)")
    }
}

/// What a fired macro inserts
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Template text with escapes, `[[k]]` captures, tab stops and `${VISUAL}`
    Template(String),
    /// Function of the captures
    Generator(Generator),
}

impl Replacement {
    /// Whether this replacement needs selected text and so never fires from typing
    pub fn is_visual(&self) -> bool {
        match self {
            Replacement::Template(t) => t.contains(VISUAL_TOKEN),
            Replacement::Generator(_) => false,
        }
    }
}

impl From<&str> for Replacement {
    fn from(s: &str) -> Self {
        Replacement::Template(s.to_string())
    }
}

impl From<String> for Replacement {
    fn from(s: String) -> Self {
        Replacement::Template(s)
    }
}

impl From<Generator> for Replacement {
    fn from(g: Generator) -> Self {
        Replacement::Generator(g)
    }
}

/// Applicability flags parsed from an option string such as `"mA"` or `"rm"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroOptions {
    /// `m`: only inside math
    pub math: bool,
    /// `t`: only outside math
    pub text: bool,
    /// `r`: literal trigger is a pattern source
    pub regex: bool,
    raw: String,
}

impl MacroOptions {
    pub fn parse(flags: &str) -> Self {
        Self {
            math: flags.contains('m'),
            text: flags.contains('t'),
            regex: flags.contains('r'),
            raw: flags.to_string(),
        }
    }

    /// The flag string as written, unknown flags included
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether a macro with these options may fire in the given mode
    pub fn applies_in(&self, in_math: bool) -> bool {
        if self.math && !in_math {
            return false;
        }
        if self.text && in_math {
            return false;
        }
        true
    }
}

impl From<&str> for MacroOptions {
    fn from(s: &str) -> Self {
        MacroOptions::parse(s)
    }
}

/// A rewrite rule
#[derive(Debug, Clone)]
pub struct Macro {
    pub trigger: Trigger,
    pub replacement: Replacement,
    pub options: MacroOptions,
    pub priority: i32,
    pub id: Option<String>,
}

impl Macro {
    /// Create a macro with no options and priority 0
    pub fn new(trigger: impl Into<Trigger>, replacement: impl Into<Replacement>) -> Self {
        Self {
            trigger: trigger.into(),
            replacement: replacement.into(),
            options: MacroOptions::default(),
            priority: 0,
            id: None,
        }
    }

    pub fn with_options(mut self, flags: &str) -> Self {
        self.options = MacroOptions::parse(flags);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
