//! Platform directories for config, cache, and saved conversations.

use std::path::PathBuf;

use crate::core::app;

pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/interlink-chat/). A `.env` placed here is loaded too.
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/interlink-chat/). Holds the interactive-mode log file.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Saved conversations (~/.local/share/interlink-chat/conversations/).
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().join("conversations"))
}
