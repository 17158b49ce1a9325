//! Expand and select modes.

use anyhow::Context;
use std::io::{self, Write};

use super::{read_text, to_byte_offset};
use crate::cli::Cli;
use texsnip::config::Config;
use texsnip::core::{Expansion, Macro, expand_selection, match_macros};

/// Expand the macro ending at the cursor and print the result as JSON.
pub fn run_expand_mode(cli: &Cli, config: &Config, macros: &[Macro]) -> anyhow::Result<()> {
    let text = read_text(cli)?;
    let cursor = cli
        .cursor
        .map_or(text.len(), |c| to_byte_offset(&text, c, config));
    let force_math = config.get_bool("force_math").unwrap_or(false);

    let expansion = match_macros(&text, cursor, macros, force_math);
    print_expansion(expansion.as_ref(), config)
}

/// Apply a visual macro to the selected range and print the result as JSON.
pub fn run_select_mode(cli: &Cli, config: &Config, macros: &[Macro]) -> anyhow::Result<()> {
    let text = read_text(cli)?;
    let (start, end) = cli.select.context("--select is required")?;
    let name = cli.visual.as_deref().context("--visual is required")?;

    let mac = find_visual_macro(macros, name)
        .with_context(|| format!("No macro with id or trigger {:?}", name))?;
    if !mac.replacement.is_visual() {
        tracing::warn!("Macro {:?} has no ${{VISUAL}} placeholder", name);
    }

    let expansion = expand_selection(
        &text,
        to_byte_offset(&text, start, config),
        to_byte_offset(&text, end, config),
        mac,
    );
    print_expansion(Some(&expansion), config)
}

/// Find a macro by id, falling back to the trigger of a visual macro.
/// Later declarations win.
fn find_visual_macro<'a>(macros: &'a [Macro], name: &str) -> Option<&'a Macro> {
    macros
        .iter()
        .rev()
        .find(|m| m.id.as_deref() == Some(name))
        .or_else(|| {
            macros
                .iter()
                .rev()
                .find(|m| m.replacement.is_visual() && m.trigger.source() == name)
        })
}

fn print_expansion(expansion: Option<&Expansion>, config: &Config) -> anyhow::Result<()> {
    let expansion = expansion.map(|e| {
        if config.utf16_offsets() {
            e.to_utf16()
        } else {
            e.clone()
        }
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, &expansion)?;
    writeln!(out)?;
    Ok(())
}
