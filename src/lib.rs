pub mod config;
pub mod core;
pub mod macro_set;
pub mod user_config;

pub use crate::core::{Expansion, Macro, match_macros};
