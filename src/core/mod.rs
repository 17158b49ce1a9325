//! This module constitutes the headless expansion engine of texsnip.
//! It detects math mode, matches triggers against the text before the cursor,
//! compiles replacements into clean text with tab stops, and tracks tab-stop
//! navigation for the embedding editor.

pub mod dispatcher;
pub mod macros;
pub mod math_mode;
pub mod session;
pub mod snippets;
pub mod utf8;

pub use dispatcher::{Expansion, expand_selection, match_macros};
pub use macros::{
    Generator, GeneratorError, Macro, MacroOptions, Pattern, Replacement, Trigger,
};
pub use math_mode::is_inside_math;
pub use session::TabStopSession;
pub use snippets::{MacroResult, compile};
