//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables
//! 3. Repo-local config (.ecosystem.toml)
//! 4. Global config (~/.config/ecosystem/config.toml)
//! 5. Defaults

mod discovery;
mod types;

pub use discovery::{
    ConfigError, ConfigOverrides, HOST_NAME_ENV, REPO_CONFIG_FILE, load_config_file, resolve_config,
};
pub use types::{Config, CoreConfig, ENABLED_KEY, MODULE_KEY, PluginSection};
