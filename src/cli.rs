//! Command-line argument parsing for texsnip.
//!
//! This module provides the `Cli` struct which encapsulates all command-line
//! options and methods for parsing them.

use anyhow::{Context, bail};
use std::path::PathBuf;
use texsnip::config::Config;

/// Command-line interface configuration.
#[derive(Debug, Default)]
pub struct Cli {
    /// Buffer text; read from stdin when absent
    pub text: Option<String>,

    /// Cursor offset (defaults to the end of the text)
    pub cursor: Option<usize>,

    /// Extra macro file (YAML or code form)
    pub macros_file: Option<PathBuf>,

    /// Skip the embedded default macros
    pub no_defaults: bool,

    /// Treat the cursor as inside math
    pub math: bool,

    /// Offsets are UTF-16 code units
    pub utf16: bool,

    /// Selected range for a visual macro
    pub select: Option<(usize, usize)>,

    /// Id (or trigger) of the visual macro to apply to the selection
    pub visual: Option<String>,

    /// List the loaded macros
    pub list: bool,

    /// Print the loaded macro set as YAML
    pub dump_yaml: bool,

    /// Print the loaded macro set in code form
    pub dump_code: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse() -> anyhow::Result<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    /// Parse an argument list (without the program name).
    pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut cli = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--" => {
                    // Everything after `--` is TEXT, even if it starts with '-'
                    if let Some(text) = args.next() {
                        cli.text = Some(text);
                    }
                    if args.next().is_some() {
                        bail!("Only one TEXT argument is accepted");
                    }
                    break;
                }
                "-n" | "--no-defaults" => cli.no_defaults = true,
                "-M" | "--math" => cli.math = true,
                "-u" | "--utf16" => cli.utf16 = true,
                "-l" | "--list" => cli.list = true,
                "--dump-yaml" => cli.dump_yaml = true,
                "--dump-code" => cli.dump_code = true,
                "-m" | "--macros" => {
                    let path = args.next().context("--macros requires a value")?;
                    cli.macros_file = Some(PathBuf::from(path));
                }
                "-c" | "--cursor" => {
                    let value = args.next().context("--cursor requires a value")?;
                    let cursor = value
                        .parse::<usize>()
                        .with_context(|| format!("Invalid cursor: {}", value))?;
                    cli.cursor = Some(cursor);
                }
                "-s" | "--select" => {
                    let value = args.next().context("--select requires a value")?;
                    cli.select = Some(parse_range(&value)?);
                }
                "-v" | "--visual" => {
                    cli.visual = Some(args.next().context("--visual requires a value")?);
                }
                "-h" | "--help" => {
                    println!("texsnip - LaTeX snippet expansion");
                    println!();
                    println!("Usage: texsnip [OPTIONS] [--] [TEXT]");
                    println!();
                    println!("Expands the macro whose trigger ends at the cursor and prints");
                    println!("the result as JSON (null when nothing fires). TEXT defaults to stdin.");
                    println!();
                    println!("Options:");
                    println!("  -h, --help               Show this help message");
                    println!("  -c, --cursor N           Cursor offset (default: end of text)");
                    println!("  -m, --macros FILE        Load an extra macro file");
                    println!("  -n, --no-defaults        Do not load the default macros");
                    println!("  -M, --math               Treat the cursor as inside math");
                    println!("  -u, --utf16              Offsets are UTF-16 code units");
                    println!("  -s, --select START:END   Selection for a visual macro");
                    println!("  -v, --visual ID          Visual macro to apply (id or trigger)");
                    println!("  -l, --list               List loaded macros");
                    println!("      --dump-yaml          Print loaded macros as YAML");
                    println!("      --dump-code          Print loaded macros in code form");
                    std::process::exit(0);
                }
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    bail!("Unknown flag: {}. Use --help for usage.", arg);
                }
                _ => {
                    if cli.text.is_some() {
                        bail!("Only one TEXT argument is accepted");
                    }
                    cli.text = Some(arg);
                }
            }
        }

        if cli.select.is_some() != cli.visual.is_some() {
            bail!("--select and --visual must be given together");
        }

        Ok(cli)
    }

    /// Apply CLI overrides to a configuration object.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(path) = &self.macros_file {
            config.set("macros_file", path.to_string_lossy().into_owned());
        }
        if self.no_defaults {
            config.set("use_defaults", false);
        }
        if self.math {
            config.set("force_math", true);
        }
        if self.utf16 {
            config.set("offset_unit", "utf16");
        }
    }
}

/// Parse `START:END`
fn parse_range(value: &str) -> anyhow::Result<(usize, usize)> {
    let (start, end) = value
        .split_once(':')
        .with_context(|| format!("Invalid range (expected START:END): {}", value))?;
    let start = start
        .parse::<usize>()
        .with_context(|| format!("Invalid range start: {}", start))?;
    let end = end
        .parse::<usize>()
        .with_context(|| format!("Invalid range end: {}", end))?;
    Ok((start, end))
}
