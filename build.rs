//! Build script: validates builtin-commands.json at compile time.

use std::collections::HashSet;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "builtin-commands.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", config_path.display());
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. builtin-commands.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct BuiltinCommandEntry {
        name: String,
        description: String,
        prompt_template: String,
        display_text: String,
    }
    let entries: Vec<BuiltinCommandEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "builtin-commands.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    let mut seen = HashSet::new();
    for entry in &entries {
        if entry.name.is_empty() || entry.prompt_template.trim().is_empty() {
            panic!("builtin-commands.json: every command needs a name and a prompt_template");
        }
        if !seen.insert(entry.name.to_lowercase()) {
            panic!("builtin-commands.json: duplicate command '{}'", entry.name);
        }
    }
}
