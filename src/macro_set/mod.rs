//! Macro set configuration
//!
//! Two external representations of a macro set:
//! - a structured YAML list (`macros.yaml`)
//! - a line-based code form, see [`code`]
//!
//! The default set is embedded at compile time and can be extended by a
//! project-local `macros.yaml` and a user file. Later entries win ties, so
//! user macros override defaults with the same trigger.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::macros::{Macro, MacroOptions, Pattern, Replacement, Trigger};

pub mod code;

pub use code::{parse_macro_code, serialize_macro_code};

/// Default macro set YAML embedded at compile time
const DEFAULT_MACROS_YAML: &str = include_str!("../../assets/default_macros.yaml");

/// Errors raised while reading or writing macro sets
#[derive(Debug, Error)]
pub enum MacroSetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("macro #{0} needs exactly one of `trigger` or `pattern`")]
    MissingTrigger(usize),
    #[error("macro #{index} cannot be serialized: {reason}")]
    Unserializable { index: usize, reason: &'static str },
}

/// Root structure of a macro YAML file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MacroSetConfig {
    #[serde(default)]
    pub macros: Vec<MacroEntry>,
}

/// A single macro entry from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub options: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

/// Compile a pattern, reporting the source on failure
pub(crate) fn compile_pattern(source: &str) -> Result<Pattern, MacroSetError> {
    Pattern::new(source).map_err(|e| MacroSetError::InvalidPattern {
        pattern: source.to_string(),
        source: e,
    })
}

impl MacroEntry {
    fn into_macro(self, index: usize) -> Result<Macro, MacroSetError> {
        let options = MacroOptions::parse(&self.options);
        let trigger = match (self.trigger, self.pattern) {
            (Some(t), None) if !t.is_empty() => {
                if options.regex {
                    Trigger::Pattern(compile_pattern(&t)?)
                } else {
                    Trigger::Literal(t)
                }
            }
            (None, Some(p)) if !p.is_empty() => Trigger::Pattern(compile_pattern(&p)?),
            _ => return Err(MacroSetError::MissingTrigger(index)),
        };

        Ok(Macro {
            trigger,
            replacement: Replacement::Template(self.replacement),
            options,
            priority: self.priority,
            id: self.id,
        })
    }

    fn from_macro(index: usize, mac: &Macro) -> Result<Self, MacroSetError> {
        let replacement = match &mac.replacement {
            Replacement::Template(t) => t.clone(),
            Replacement::Generator(_) => {
                return Err(MacroSetError::Unserializable {
                    index,
                    reason: "generator replacements have no text form",
                });
            }
        };
        let (trigger, pattern) = match &mac.trigger {
            Trigger::Literal(t) => (Some(t.clone()), None),
            Trigger::Pattern(p) => (None, Some(p.as_str().to_string())),
        };

        Ok(Self {
            trigger,
            pattern,
            replacement,
            options: mac.options.as_str().to_string(),
            priority: mac.priority,
            id: mac.id.clone(),
        })
    }
}

/// Parse macros from a YAML string
pub fn parse_macro_yaml(yaml: &str) -> Result<Vec<Macro>, MacroSetError> {
    let config: MacroSetConfig = serde_yaml::from_str(yaml)?;

    config
        .macros
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_macro(index))
        .collect()
}

/// Load macros from a file; `.yaml`/`.yml` files are YAML, anything else is code form
pub fn load_macro_file(path: &Path) -> Result<Vec<Macro>, MacroSetError> {
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => parse_macro_yaml(&content),
        _ => parse_macro_code(&content),
    }
}

/// Serialize macros to the YAML list form
pub fn to_macro_yaml(macros: &[Macro]) -> Result<String, MacroSetError> {
    let config = MacroSetConfig {
        macros: macros
            .iter()
            .enumerate()
            .map(|(index, mac)| MacroEntry::from_macro(index, mac))
            .collect::<Result<_, _>>()?,
    };
    Ok(serde_yaml::to_string(&config)?)
}

/// The embedded default macro set
pub fn default_macros() -> Vec<Macro> {
    match parse_macro_yaml(DEFAULT_MACROS_YAML) {
        Ok(macros) => {
            tracing::info!("Loaded embedded default macros ({} macros)", macros.len());
            macros
        }
        Err(e) => {
            tracing::warn!("Failed to parse embedded macros: {}", e);
            Vec::new()
        }
    }
}

/// Get the user's macro file path
///
/// Returns `~/.config/texsnip/macros.yaml` on Unix
pub fn user_macro_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join("texsnip").join("macros.yaml"))
}

/// Load and layer macro sets
///
/// Loading order (later layers win ties):
/// 1. Embedded defaults, when `with_defaults` is set
/// 2. `macros.yaml` in the current directory
/// 3. The user file at [`user_macro_path`]
pub fn load_layered_macros(with_defaults: bool) -> Vec<Macro> {
    let mut macros = if with_defaults {
        default_macros()
    } else {
        Vec::new()
    };

    let local = Path::new("macros.yaml");
    if local.exists() {
        match load_macro_file(local) {
            Ok(local_macros) => {
                tracing::info!("Merging project macros.yaml ({} macros)", local_macros.len());
                macros.extend(local_macros);
            }
            Err(e) => tracing::warn!("Failed to load project macros.yaml: {}", e),
        }
    }

    if let Some(user_path) = user_macro_path() {
        if user_path.exists() {
            match load_macro_file(&user_path) {
                Ok(user_macros) => {
                    tracing::info!(
                        "Merging user macros from {} ({} macros)",
                        user_path.display(),
                        user_macros.len()
                    );
                    macros.extend(user_macros);
                }
                Err(e) => {
                    tracing::warn!("Failed to load user macros from {}: {}", user_path.display(), e);
                }
            }
        }
    }

    macros
}
