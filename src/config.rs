//! Tabula Configuration
//!
//! Loads and saves the tool's configuration from `~/.tabula/tabula.json`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::types::{default_config, AppConfig};

/// Config file name within the tabula directory.
const CONFIG_FILENAME: &str = "tabula.json";

/// Returns the tabula directory: `~/.tabula`.
pub fn get_tabula_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/root"))
        .join(".tabula")
}

/// Returns the full path to the config file: `~/.tabula/tabula.json`.
pub fn get_config_path() -> PathBuf {
    get_tabula_dir().join(CONFIG_FILENAME)
}

/// Load the config from disk.
///
/// Reads `~/.tabula/tabula.json` and merges missing fields with
/// defaults. Returns `None` if the config file does not exist or
/// cannot be parsed.
pub fn load_config() -> Option<AppConfig> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &PathBuf) -> Option<AppConfig> {
    if !config_path.exists() {
        return None;
    }

    let contents = fs::read_to_string(config_path).ok()?;
    let mut config: AppConfig = serde_json::from_str(&contents).ok()?;

    // Merge defaults for unset fields
    let defaults = default_config();

    if config.location.is_empty() {
        config.location = defaults.location;
    }
    if config.model.is_empty() {
        config.model = defaults.model;
    }
    if config.agent_name.is_empty() {
        config.agent_name = defaults.agent_name;
    }
    if config.agent_description.is_empty() {
        config.agent_description = defaults.agent_description;
    }
    if config.prompt_name.is_empty() {
        config.prompt_name = defaults.prompt_name;
    }
    if config.prompts_dir.is_empty() {
        config.prompts_dir = defaults.prompts_dir;
    }
    if config.history_path.is_empty() {
        config.history_path = defaults.history_path;
    }
    if config.version.is_empty() {
        config.version = defaults.version;
    }

    Some(config)
}

/// Save the config to disk at `~/.tabula/tabula.json`.
///
/// Creates the tabula directory with mode 0o700 if it does not
/// exist. The config file is written with mode 0o600.
pub fn save_config(config: &AppConfig) -> Result<()> {
    let dir = get_tabula_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir).context("Failed to create tabula directory")?;
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
    }

    let config_path = get_config_path();
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&config_path, &json).context("Failed to write config file")?;
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

/// Resolve a path that may start with `~` to an absolute path.
pub fn resolve_path(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix('~') {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        home.join(rest)
    } else {
        PathBuf::from(p)
    }
}
