use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-plugin configuration: arbitrary key → JSON value
pub type PluginConfig = serde_json::Map<String, serde_json::Value>;

/// Broad category a plugin belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Agent,
    Tool,
    Integration,
    Middleware,
    Workflow,
    Custom,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Agent => "agent",
            PluginType::Tool => "tool",
            PluginType::Integration => "integration",
            PluginType::Middleware => "middleware",
            PluginType::Workflow => "workflow",
            PluginType::Custom => "custom",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin lifecycle status
///
/// Held in exactly one place: the manager's registry entry for the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    /// Registered but never successfully initialized
    Installed,
    Enabled,
    /// Initialized, resources still held, execution gated off
    Disabled,
    /// Enabling failed
    Error,
    Loading,
}

impl PluginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginStatus::Installed => "installed",
            PluginStatus::Enabled => "enabled",
            PluginStatus::Disabled => "disabled",
            PluginStatus::Error => "error",
            PluginStatus::Loading => "loading",
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema entry for one configuration key. Only presence is ever checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ConfigField {
    pub fn required() -> Self {
        Self {
            required: true,
            description: None,
        }
    }

    pub fn optional() -> Self {
        Self::default()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Plugin metadata: identity, declared needs and config schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Registry key
    pub name: String,
    /// Free-form, not semver-validated
    pub version: String,
    pub description: String,
    pub author: String,
    pub plugin_type: PluginType,
    /// Plugin names this plugin expects to be loaded first (declarative)
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// External library requirements (declarative)
    #[serde(default)]
    pub requirements: Vec<String>,
    pub entry_point: String,
    #[serde(default)]
    pub config_schema: BTreeMap<String, ConfigField>,
}

impl PluginMetadata {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        plugin_type: PluginType,
    ) -> Self {
        let name = name.into();
        Self {
            entry_point: name.clone(),
            name,
            version: version.into(),
            description: String::new(),
            author: String::new(),
            plugin_type,
            dependencies: Vec::new(),
            requirements: Vec::new(),
            config_schema: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn with_dependency(mut self, plugin: impl Into<String>) -> Self {
        self.dependencies.push(plugin.into());
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    pub fn with_config_field(mut self, key: impl Into<String>, field: ConfigField) -> Self {
        self.config_schema.insert(key.into(), field);
        self
    }

    /// Keys marked `required` in the config schema, in key order
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.config_schema
            .iter()
            .filter(|(_, field)| field.required)
            .map(|(key, _)| key.as_str())
    }
}

/// Read-only snapshot of a plugin for listing and introspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    #[serde(rename = "type")]
    pub plugin_type: PluginType,
    pub status: PluginStatus,
    pub config: PluginConfig,
}

/// Errors raised by plugin implementations
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin init failed: {message}")]
    Init {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("plugin execution failed: {message}")]
    Execution {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("plugin cleanup failed: {message}")]
    Cleanup {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("plugin config error: {message}")]
    Config { message: String },
}

impl PluginError {
    pub fn init(message: impl Into<String>) -> Self {
        PluginError::Init {
            message: message.into(),
            source: None,
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        PluginError::Execution {
            message: message.into(),
            source: None,
        }
    }

    pub fn cleanup(message: impl Into<String>) -> Self {
        PluginError::Cleanup {
            message: message.into(),
            source: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PluginError::Config {
            message: message.into(),
        }
    }
}
