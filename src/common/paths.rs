//! Configuration file locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/ui-harness/`
//! - macOS: `~/Library/Application Support/ui-harness/`
//! - Windows: `%APPDATA%\ui-harness\`

use std::path::{Path, PathBuf};

/// Application name used for per-user directories
const APP_NAME: &str = "ui-harness";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}
