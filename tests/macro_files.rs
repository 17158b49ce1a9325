//! Macro File Tests
//!
//! Loading macro sets from disk in both text forms and using them directly.

use std::io::Write;

use tempfile::NamedTempFile;
use texsnip::core::{Trigger, match_macros};
use texsnip::macro_set::{
    MacroSetError, default_macros, load_macro_file, parse_macro_code, serialize_macro_code,
};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let Ok(mut file) = tempfile::Builder::new().suffix(suffix).tempfile() else {
        panic!("Failed to create temp file");
    };
    if file.write_all(content.as_bytes()).is_err() {
        panic!("Failed to write temp file");
    }
    file
}

#[test]
fn load_yaml_file() {
    let file = temp_file(
        ".yaml",
        r#"
macros:
  - trigger: ";x"
    replacement: "\\xi"
    options: "mA"
  - pattern: "hat([a-z])"
    replacement: "\\hat{[[0]]}"
    options: "m"
    priority: 1
"#,
    );

    let macros = match load_macro_file(file.path()) {
        Ok(m) => m,
        Err(e) => panic!("Expected YAML to load: {}", e),
    };
    assert_eq!(macros.len(), 2);
    assert!(matches!(macros[1].trigger, Trigger::Pattern(_)));

    let exp = match_macros("$hatv", 5, &macros, false);
    assert_eq!(exp.map(|e| e.text), Some(r"$\hat{v}".to_string()));
}

#[test]
fn load_code_file() {
    let file = temp_file(
        ".snippets",
        "# my macros\ns/;x/\\xi/mA\ns|(\\d)x|[[0]] \\times|rm:2\n",
    );

    let macros = match load_macro_file(file.path()) {
        Ok(m) => m,
        Err(e) => panic!("Expected code form to load: {}", e),
    };
    assert_eq!(macros.len(), 2);
    assert_eq!(macros[1].priority, 2);

    let exp = match_macros("$2x", 3, &macros, false);
    assert_eq!(exp.map(|e| e.text), Some(r"$2 \times".to_string()));
}

#[test]
fn missing_file_is_io_error() {
    let result = load_macro_file(std::path::Path::new("/nonexistent/texsnip.yaml"));
    assert!(matches!(result, Err(MacroSetError::Io(_))));
}

#[test]
fn bad_yaml_is_reported() {
    let file = temp_file(".yml", "macros: [ { trigger: ");
    assert!(matches!(
        load_macro_file(file.path()),
        Err(MacroSetError::Yaml(_))
    ));
}

#[test]
fn code_form_round_trip_preserves_behaviour() {
    // the defaults minus the multi-line display math macro
    let macros: Vec<_> = default_macros()
        .into_iter()
        .filter(|m| m.trigger.source() != "dm")
        .collect();

    let code = match serialize_macro_code(&macros) {
        Ok(c) => c,
        Err(e) => panic!("Expected serializable defaults: {}", e),
    };
    let reparsed = match parse_macro_code(&code) {
        Ok(m) => m,
        Err(e) => panic!("Expected reparse: {}", e),
    };
    assert_eq!(reparsed.len(), macros.len());

    for (text, cursor) in [("$x/f$", 4), ("$x1", 3), ("$3/", 3), ("mk", 2), ("$;a", 3)] {
        assert_eq!(
            match_macros(text, cursor, &macros, false),
            match_macros(text, cursor, &reparsed, false),
            "diverged on {:?}",
            text
        );
    }
}
