//! Echo plugin: greets whatever it is given
//!
//! Config:
//! - `greeting` (required): text prepended to the echoed arguments

use crate::plugin::{
    ConfigField, Plugin, PluginConfig, PluginError, PluginFactory, PluginMetadata, PluginType,
};
use serde_json::Value;
use tracing::debug;

pub struct EchoPlugin {
    metadata: PluginMetadata,
    config: PluginConfig,
    ready: bool,
}

impl EchoPlugin {
    /// Catalog path the built-in echo plugin is registered under
    pub const MODULE: &'static str = "builtin.echo";

    pub fn new(config: PluginConfig) -> Self {
        Self {
            metadata: Self::describe(),
            config,
            ready: false,
        }
    }

    pub fn describe() -> PluginMetadata {
        PluginMetadata::new("echo", env!("CARGO_PKG_VERSION"), PluginType::Tool)
            .with_description("Echoes its arguments behind a configured greeting")
            .with_author("ecosystem contributors")
            .with_entry_point(Self::MODULE)
            .with_config_field(
                "greeting",
                ConfigField::required().describe("text placed before the echoed arguments"),
            )
    }

    pub fn factory() -> PluginFactory {
        PluginFactory::new("EchoPlugin", "Echoes its arguments", |config| {
            Ok(EchoPlugin::new(config))
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Plugin for EchoPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut PluginConfig {
        &mut self.config
    }

    async fn initialize(&mut self) -> Result<(), PluginError> {
        self.ready = true;
        debug!("Echo plugin ready");
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), PluginError> {
        self.ready = false;
        Ok(())
    }

    async fn execute(&mut self, args: Vec<Value>) -> Result<Value, PluginError> {
        if !self.ready {
            return Err(PluginError::execution("echo plugin is not initialized"));
        }

        let greeting = self.get_config("greeting").map(render).unwrap_or_default();
        if args.is_empty() {
            return Ok(Value::String(greeting));
        }

        let echoed: Vec<String> = args.iter().map(render).collect();
        Ok(Value::String(format!("{greeting}, {}", echoed.join(" "))))
    }
}
