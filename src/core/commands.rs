//! Prebuilt commands: named templates that prefix the next prompt.
//!
//! Loaded from `config/builtin-commands.json` (embedded at compile time, validated by build.rs).

use std::sync::OnceLock;

use serde::Deserialize;

use crate::core::util::filter_by_query;

/// A prebuilt command.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PrebuiltCommand {
    pub name: String,
    pub description: String,
    /// Instruction text placed before the user's prompt.
    pub prompt_template: String,
    /// Label shown when the command is selected.
    pub display_text: String,
}

impl PrebuiltCommand {
    /// Full command string including slash, e.g. "/quiz".
    pub fn full_name(&self) -> String {
        format!("/{}", self.name)
    }

    /// Template, newline, then the raw prompt.
    pub fn apply(&self, prompt: &str) -> String {
        format!("{}\n{}", self.prompt_template, prompt)
    }
}

fn load_builtin_commands() -> Vec<PrebuiltCommand> {
    let json = include_str!("../../config/builtin-commands.json");
    match serde_json::from_str(json) {
        Ok(commands) => commands,
        Err(e) => {
            // build.rs rejects an invalid file, so this only triggers on a stale build
            log::error!("builtin-commands.json is invalid: {}", e);
            Vec::new()
        }
    }
}

static BUILTIN_COMMANDS: OnceLock<Vec<PrebuiltCommand>> = OnceLock::new();

/// Returns all prebuilt commands, loading from config on first access.
pub fn builtin_commands() -> &'static [PrebuiltCommand] {
    BUILTIN_COMMANDS.get_or_init(load_builtin_commands)
}

/// Look up a command by name (case-insensitive, leading slash optional).
pub fn find_command(name: &str) -> Option<&'static PrebuiltCommand> {
    let name = name.trim();
    let name = name.strip_prefix('/').unwrap_or(name);
    builtin_commands()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Filter commands by query (case-insensitive match on name or description).
pub fn filter_commands(query: &str) -> Vec<&'static PrebuiltCommand> {
    filter_by_query(builtin_commands(), query, |c| {
        (c.name.as_str(), c.description.as_str())
    })
}
