//! Configuration discovery and resolution

use super::types::Config;
use crate::home;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Repo-local config file name
pub const REPO_CONFIG_FILE: &str = ".ecosystem.toml";

/// Environment variable overriding `core.host_name`
pub const HOST_NAME_ENV: &str = "ECO_HOST_NAME";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON conversion error
    #[error("JSON conversion error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Structurally valid TOML with an unusable value
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override host name
    pub host_name: Option<String>,
    /// Explicit config file; loaded last among files and must parse
    pub config_path: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides (an explicit `config_path` is merged above the
///    discovered files)
/// 2. Environment variables
/// 3. Repo-local config (.ecosystem.toml in current dir or up to the git root)
/// 4. Global config (~/.config/ecosystem/config.toml)
/// 5. Defaults
///
/// Discovered files that fail to parse are logged and skipped. An explicit
/// `config_path` that fails to load is an error.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // 4. Try global config
    let global_config_path = home::config_dir(home_dir).join("config.toml");
    if global_config_path.exists() {
        match read_config_layer(&global_config_path) {
            Ok(file_config) => merge_config(&mut config, file_config),
            Err(e) => warn!("Failed to parse global config at {global_config_path:?}: {e}"),
        }
    }

    // 3. Try repo-local config (current dir or git root)
    if let Some(repo_config) = find_repo_local_config(current_dir) {
        match read_config_layer(&repo_config) {
            Ok(file_config) => merge_config(&mut config, file_config),
            Err(e) => warn!("Failed to parse repo config at {repo_config:?}: {e}"),
        }
    }

    if let Some(ref explicit) = overrides.config_path {
        let file_config = read_config_layer(explicit)?;
        debug!("Loaded explicit config from {explicit:?}");
        merge_config(&mut config, file_config);
    }

    // 2. Apply environment variables
    apply_env_overrides(&mut config);

    // 1. Apply command-line overrides
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(REPO_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

/// One config file as written. Keys it leaves out stay `None` so they do
/// not mask lower-priority files.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    core: CoreLayer,
    #[serde(default)]
    plugins: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Default, Deserialize)]
struct CoreLayer {
    host_name: Option<String>,
}

fn read_config_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Load config from a TOML file, filling unset keys with defaults
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    merge_config(&mut config, read_config_layer(path)?);
    Ok(config)
}

/// Merge one file layer into base config
fn merge_config(base: &mut Config, file: ConfigLayer) {
    if let Some(host_name) = file.core.host_name {
        base.core.host_name = host_name;
    }

    // Later sources replace whole plugin sections
    for (name, table) in file.plugins {
        base.plugins.insert(name, table);
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(host_name) = std::env::var(HOST_NAME_ENV) {
        if !host_name.trim().is_empty() {
            config.core.host_name = host_name;
        }
    }
}

fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(ref host_name) = overrides.host_name {
        config.core.host_name = host_name.clone();
    }
}
