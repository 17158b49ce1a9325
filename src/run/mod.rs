//! Run modes for texsnip.
//!
//! - Expand mode: match the macro set at the cursor and print the expansion
//! - Select mode: apply a visual macro to a selection
//! - List and dump modes: inspect the loaded macro set

mod expand;
mod listing;

use anyhow::Context;
use std::io::{self, Read};
use std::path::Path;

use crate::cli::Cli;
use texsnip::config::Config;
use texsnip::core::Macro;
use texsnip::core::utf8::utf16_to_byte;
use texsnip::macro_set;

// Re-export mode runners
pub use expand::{run_expand_mode, run_select_mode};
pub use listing::{DumpFormat, run_dump_mode, run_list_mode};

/// Execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Expand,
    Select,
    List,
    DumpYaml,
    DumpCode,
}

impl RunMode {
    /// Pick the mode requested on the command line
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.list {
            RunMode::List
        } else if cli.dump_yaml {
            RunMode::DumpYaml
        } else if cli.dump_code {
            RunMode::DumpCode
        } else if cli.select.is_some() {
            RunMode::Select
        } else {
            RunMode::Expand
        }
    }
}

/// Load the macro set and run the requested mode
pub fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let macros = load_macros(config)?;

    match RunMode::from_cli(cli) {
        RunMode::Expand => run_expand_mode(cli, config, &macros),
        RunMode::Select => run_select_mode(cli, config, &macros),
        RunMode::List => run_list_mode(&macros),
        RunMode::DumpYaml => run_dump_mode(&macros, DumpFormat::Yaml),
        RunMode::DumpCode => run_dump_mode(&macros, DumpFormat::Code),
    }
}

/// Layered macro sets plus the configured extra file
fn load_macros(config: &Config) -> anyhow::Result<Vec<Macro>> {
    let with_defaults = config.get_bool("use_defaults").unwrap_or(true);
    let mut macros = macro_set::load_layered_macros(with_defaults);

    if let Some(path) = config.get_string("macros_file") {
        let extra = macro_set::load_macro_file(Path::new(path))
            .with_context(|| format!("Failed to load macros from {}", path))?;
        tracing::info!("Loaded {} macros from {}", extra.len(), path);
        macros.extend(extra);
    }

    Ok(macros)
}

/// Buffer text from the command line, or stdin without its final newline
fn read_text(cli: &Cli) -> anyhow::Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

/// Convert an offset given on the command line to a byte offset
fn to_byte_offset(text: &str, offset: usize, config: &Config) -> usize {
    if config.utf16_offsets() {
        utf16_to_byte(text, offset)
    } else {
        offset
    }
}
