// texsnip Configuration
// Edit this file to change the built-in defaults, then rebuild.

use crate::config::Config;

/// User configuration function
pub fn configure(config: &mut Config) {
    // =========================================================================
    // MACRO SETS
    // =========================================================================
    // Start from the embedded default macros. Project `macros.yaml` and the
    // user file (~/.config/texsnip/macros.yaml) are layered on top.
    // CLI override: --no-defaults
    config.set("use_defaults", true);

    // Extra macro file loaded last (YAML, or code form for other extensions).
    // CLI override: --macros FILE
    // config.set("macros_file", "my_macros.yaml");

    // =========================================================================
    // MATCHING
    // =========================================================================
    // Treat every cursor as inside math, e.g. for a dedicated formula field.
    // CLI override: --math
    config.set("force_math", false);

    // Unit for cursor and tab-stop offsets on the command line.
    // Values: "byte" | "utf16"
    // CLI override: --utf16
    config.set("offset_unit", "byte");
}
