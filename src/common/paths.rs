//! Configuration, log and workspace paths
//!
//! Platform directories come from the directories crate:
//! - Linux: `~/.config/pester-explorer/`
//! - macOS: `~/Library/Application Support/pester-explorer/`
//! - Windows: `%APPDATA%\pester-explorer\`

use std::io;
use std::path::{Path, PathBuf};

/// Name used for platform directories
const APP_NAME: &str = "pester-explorer";

/// Per-workspace configuration file, takes precedence over the user config
pub const WORKSPACE_CONFIG_FILE: &str = "pester-explorer.toml";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the user configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the workspace configuration file
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_CONFIG_FILE)
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Ensure the log directory exists
pub fn ensure_log_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = log_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

/// Resolve the workspace root, canonicalizing when possible
pub fn resolve_workspace(workspace: Option<PathBuf>) -> io::Result<PathBuf> {
    let dir = match workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    Ok(dir.canonicalize().unwrap_or(dir))
}
