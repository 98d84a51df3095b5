use super::{PluginConfig, PluginError, PluginInfo, PluginMetadata, PluginStatus};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use tracing::error;

/// Core plugin trait. Every loadable plugin implements this.
///
/// Lifecycle: initialize() → execute()* → cleanup()
///
/// `initialize` may run again after `cleanup`, so it must not assume a fresh
/// instance. Any `Err` from `initialize` is treated as a failed load.
///
/// Uses RPITIT (Return Position Impl Trait in Traits) with explicit Send bounds.
pub trait Plugin: Send + Sync {
    /// Plugin identity, declared needs and config schema.
    fn metadata(&self) -> &PluginMetadata;

    /// The plugin's private configuration.
    fn config(&self) -> &PluginConfig;

    fn config_mut(&mut self) -> &mut PluginConfig;

    /// Acquire whatever the plugin needs (connections, buffers, ...).
    fn initialize(&mut self) -> impl Future<Output = Result<(), PluginError>> + Send;

    /// Release what `initialize` acquired.
    fn cleanup(&mut self) -> impl Future<Output = Result<(), PluginError>> + Send;

    /// Do the plugin's work. Arguments and result are opaque to the host.
    fn execute(
        &mut self,
        args: Vec<Value>,
    ) -> impl Future<Output = Result<Value, PluginError>> + Send;

    fn get_config(&self, key: &str) -> Option<&Value> {
        Plugin::config(self).get(key)
    }

    fn set_config(&mut self, key: &str, value: Value) {
        Plugin::config_mut(self).insert(key.to_string(), value);
    }

    /// Check that every `required` schema key is present in the config.
    ///
    /// Presence only: values are never type- or range-checked.
    fn validate_config(&self) -> Result<(), PluginError> {
        let metadata = Plugin::metadata(self);
        let config = Plugin::config(self);
        for key in metadata.required_keys() {
            if !config.contains_key(key) {
                error!("Required config key missing for {}: {key}", metadata.name);
                return Err(PluginError::config(format!(
                    "Required config key missing: {key}"
                )));
            }
        }
        Ok(())
    }

    /// Snapshot for listing, reporting the given lifecycle status.
    fn get_info(&self, status: PluginStatus) -> PluginInfo {
        let metadata = Plugin::metadata(self);
        PluginInfo {
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            description: metadata.description.clone(),
            author: metadata.author.clone(),
            plugin_type: metadata.plugin_type,
            status,
            config: Plugin::config(self).clone(),
        }
    }
}

/// Object-safe version of Plugin for type erasure in the registry.
///
/// This trait is implemented automatically for all types that implement Plugin.
/// The registry stores Box<dyn ErasedPlugin> internally.
pub trait ErasedPlugin: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;
    fn config(&self) -> &PluginConfig;
    fn config_mut(&mut self) -> &mut PluginConfig;
    fn initialize<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>>;
    fn cleanup<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>>;
    fn execute<'a>(
        &'a mut self,
        args: Vec<Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, PluginError>> + Send + 'a>>;
    fn get_config(&self, key: &str) -> Option<&Value>;
    fn set_config(&mut self, key: &str, value: Value);
    fn validate_config(&self) -> Result<(), PluginError>;
    fn get_info(&self, status: PluginStatus) -> PluginInfo;
}

/// Blanket implementation of ErasedPlugin for all Plugin types.
impl<T: Plugin> ErasedPlugin for T {
    fn metadata(&self) -> &PluginMetadata {
        Plugin::metadata(self)
    }

    fn config(&self) -> &PluginConfig {
        Plugin::config(self)
    }

    fn config_mut(&mut self) -> &mut PluginConfig {
        Plugin::config_mut(self)
    }

    fn initialize<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(Plugin::initialize(self))
    }

    fn cleanup<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(Plugin::cleanup(self))
    }

    fn execute<'a>(
        &'a mut self,
        args: Vec<Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Value, PluginError>> + Send + 'a>> {
        Box::pin(Plugin::execute(self, args))
    }

    fn get_config(&self, key: &str) -> Option<&Value> {
        Plugin::get_config(self, key)
    }

    fn set_config(&mut self, key: &str, value: Value) {
        Plugin::set_config(self, key, value)
    }

    fn validate_config(&self) -> Result<(), PluginError> {
        Plugin::validate_config(self)
    }

    fn get_info(&self, status: PluginStatus) -> PluginInfo {
        Plugin::get_info(self, status)
    }
}
