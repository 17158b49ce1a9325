//! List and dump modes.

use texsnip::core::{Macro, Replacement, Trigger};
use texsnip::macro_set::{serialize_macro_code, to_macro_yaml};

/// Output format for dump mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Yaml,
    Code,
}

/// Print one row per macro: index, trigger, options, priority, replacement
pub fn run_list_mode(macros: &[Macro]) -> anyhow::Result<()> {
    for (index, mac) in macros.iter().enumerate() {
        println!("{}", format_row(index, mac));
    }
    Ok(())
}

/// Print the macro set in the requested text form
pub fn run_dump_mode(macros: &[Macro], format: DumpFormat) -> anyhow::Result<()> {
    let text = match format {
        DumpFormat::Yaml => to_macro_yaml(macros)?,
        DumpFormat::Code => serialize_macro_code(macros)?,
    };
    print!("{}", text);
    Ok(())
}

fn format_row(index: usize, mac: &Macro) -> String {
    let trigger = match &mac.trigger {
        Trigger::Literal(t) => t.clone(),
        Trigger::Pattern(re) => format!("/{}/", re.as_str()),
    };
    let replacement = match &mac.replacement {
        Replacement::Template(t) => t.replace('\n', "\\n"),
        Replacement::Generator(_) => "(function)".to_string(),
    };
    format!(
        "{:>3}  {:<16} {:<5} {:>3}  {}",
        index,
        trigger,
        mac.options.as_str(),
        mac.priority,
        replacement
    )
}
