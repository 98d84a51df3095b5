//! Configuration types

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved key toggling a plugin section on or off.
pub const ENABLED_KEY: &str = "enabled";
/// Reserved key naming the catalog module path a section loads.
pub const MODULE_KEY: &str = "module";

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core configuration
    #[serde(default)]
    pub core: CoreConfig,
    /// Plugin-specific configuration sections: [plugins.<name>]
    #[serde(default)]
    pub plugins: BTreeMap<String, toml::Table>,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Display name of the host process, used in log lines
    #[serde(default = "default_host_name")]
    pub host_name: String,
}

fn default_host_name() -> String {
    "eco-host".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
        }
    }
}

impl Config {
    /// Get a plugin's configuration section by name.
    /// Returns None if the plugin has no config section.
    pub fn plugin_config(&self, name: &str) -> Option<&toml::Table> {
        self.plugins.get(name)
    }

    /// Parse every `[plugins.<name>]` section, in name order.
    pub fn plugin_sections(&self) -> Result<Vec<PluginSection>, ConfigError> {
        self.plugins
            .iter()
            .map(|(name, table)| PluginSection::from_table(name, table))
            .collect()
    }
}

/// One `[plugins.<name>]` section split into host keys and plugin config.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSection {
    /// Section name
    pub name: String,
    /// Whether the host should load this plugin (default: true)
    pub enabled: bool,
    /// Catalog module path (default: the section name)
    pub module: String,
    /// Remaining keys, handed to the plugin as its configuration
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl PluginSection {
    /// Split a section table into reserved keys and plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `enabled` is not a boolean or
    /// `module` is not a string, and `ConfigError::JsonParse` when a value
    /// cannot be represented as JSON.
    pub fn from_table(name: &str, table: &toml::Table) -> Result<Self, ConfigError> {
        let enabled = match table.get(ENABLED_KEY) {
            None => true,
            Some(toml::Value::Boolean(b)) => *b,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "plugins.{name}.{ENABLED_KEY} must be a boolean, got {}",
                        other.type_str()
                    ),
                });
            }
        };

        let module = match table.get(MODULE_KEY) {
            None => name.to_string(),
            Some(toml::Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "plugins.{name}.{MODULE_KEY} must be a string, got {}",
                        other.type_str()
                    ),
                });
            }
        };

        let mut config = serde_json::Map::new();
        for (key, value) in table {
            if key == ENABLED_KEY || key == MODULE_KEY {
                continue;
            }
            config.insert(key.clone(), serde_json::to_value(value)?);
        }

        Ok(Self {
            name: name.to_string(),
            enabled,
            module,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.core.host_name, "eco-host");
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_plugin_config_accessor() {
        let toml_str = r#"
[core]
host_name = "test-host"

[plugins.echo]
greeting = "hi"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.core.host_name, "test-host");

        let echo = config.plugin_config("echo").unwrap();
        assert_eq!(echo.get("greeting").unwrap().as_str(), Some("hi"));
        assert!(config.plugin_config("missing").is_none());
    }

    #[test]
    fn test_plugin_section_defaults() {
        let table: toml::Table = toml::from_str(r#"greeting = "hi""#).unwrap();
        let section = PluginSection::from_table("echo", &table).unwrap();

        assert!(section.enabled);
        assert_eq!(section.module, "echo");
        assert_eq!(section.config.get("greeting"), Some(&serde_json::json!("hi")));
    }

    #[test]
    fn test_plugin_section_strips_reserved_keys() {
        let toml_str = r#"
enabled = false
module = "builtin.echo"
greeting = "hello"
retries = 3
tags = ["a", "b"]
"#;
        let table: toml::Table = toml::from_str(toml_str).unwrap();
        let section = PluginSection::from_table("greeter", &table).unwrap();

        assert!(!section.enabled);
        assert_eq!(section.module, "builtin.echo");
        assert!(!section.config.contains_key(ENABLED_KEY));
        assert!(!section.config.contains_key(MODULE_KEY));
        assert_eq!(section.config.get("retries"), Some(&serde_json::json!(3)));
        assert_eq!(section.config.get("tags"), Some(&serde_json::json!(["a", "b"])));
    }

    #[test]
    fn test_plugin_section_rejects_bad_enabled() {
        let table: toml::Table = toml::from_str(r#"enabled = "yes""#).unwrap();
        let err = PluginSection::from_table("echo", &table).unwrap_err();
        assert!(err.to_string().contains("plugins.echo.enabled"));
    }

    #[test]
    fn test_plugin_sections_in_name_order() {
        let toml_str = r#"
[plugins.zeta]
[plugins.alpha]
module = "builtin.alpha"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let names: Vec<String> = config
            .plugin_sections()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
