//! Plugin manager: registry, lifecycle, execution and extension points
//!
//! Lifecycle per plugin, keyed by name:
//!
//! ```text
//! (absent) --load_plugin--> Enabled --disable_plugin--> Disabled
//! Disabled --enable_plugin--> Enabled     (no re-initialize)
//! Installed --enable_plugin--> Enabled | Error   (initializes)
//! (any) --unload_plugin--> (absent)       (cleanup first, always removed)
//! ```
//!
//! Lifecycle and discovery operations fail soft: they return `bool` and log
//! the reason. `try_*` variants return the structured [`ManagerError`].
//! A panic inside `initialize` or `cleanup` counts as that step failing.
//! [`PluginManager::execute_plugin`] always returns its error to the caller.

use super::callback::panic_message;
use super::{
    DiscoveryError, ErasedPlugin, EventBus, EventHandler, HookCallback, HookRegistry,
    PluginCatalog, PluginConfig, PluginError, PluginInfo, PluginMetadata, PluginStatus,
    PluginType,
};
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("plugin configuration validation failed: {name}: {source}")]
    Validation {
        name: String,
        #[source]
        source: PluginError,
    },

    #[error("plugin initialization failed: {name}: {source}")]
    Initialization {
        name: String,
        #[source]
        source: PluginError,
    },

    #[error("plugin not found: {0}")]
    NotFound(String),

    #[error("plugin not enabled: {name} (status: {status})")]
    NotEnabled { name: String, status: PluginStatus },

    #[error("plugin execution failed {name}: {source}")]
    Execution {
        name: String,
        #[source]
        source: PluginError,
    },

    #[error("plugin {name} was removed but cleanup failed: {source}")]
    Cleanup {
        name: String,
        #[source]
        source: PluginError,
    },
}

/// Registry entry: a plugin instance and its lifecycle status.
///
/// The status lives here and nowhere else.
pub struct LoadedPlugin {
    plugin: Box<dyn ErasedPlugin>,
    status: PluginStatus,
}

impl LoadedPlugin {
    pub fn name(&self) -> &str {
        &self.plugin.metadata().name
    }

    pub fn metadata(&self) -> &PluginMetadata {
        self.plugin.metadata()
    }

    pub fn status(&self) -> PluginStatus {
        self.status
    }

    pub fn is_enabled(&self) -> bool {
        self.status == PluginStatus::Enabled
    }

    pub fn config(&self) -> &PluginConfig {
        self.plugin.config()
    }

    pub fn get_config(&self, key: &str) -> Option<&Value> {
        self.plugin.get_config(key)
    }

    pub fn set_config(&mut self, key: &str, value: Value) {
        self.plugin.set_config(key, value);
    }

    pub fn info(&self) -> PluginInfo {
        self.plugin.get_info(self.status)
    }

}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("name", &self.name())
            .field("status", &self.status)
            .finish()
    }
}

/// Owns the plugin registry plus the hook and event namespaces.
///
/// Not internally synchronized: every mutating call takes `&mut self`.
/// Hosts sharing one manager across tasks wrap it in a mutex.
pub struct PluginManager {
    catalog: PluginCatalog,
    /// Registry in load order; names are unique
    plugins: Vec<LoadedPlugin>,
    hooks: HookRegistry,
    events: EventBus,
}

impl PluginManager {
    /// Create a manager with an empty catalog
    pub fn new() -> Self {
        Self::with_catalog(PluginCatalog::new())
    }

    /// Create a manager resolving module paths through `catalog`
    pub fn with_catalog(catalog: PluginCatalog) -> Self {
        Self {
            catalog,
            plugins: Vec::new(),
            hooks: HookRegistry::new(),
            events: EventBus::new(),
        }
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut PluginCatalog {
        &mut self.catalog
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load, validate and initialize the plugin found at `plugin_path`.
    ///
    /// Returns false on any failure; the reason is logged.
    pub async fn load_plugin(&mut self, plugin_path: &str, config: Option<PluginConfig>) -> bool {
        match self.try_load_plugin(plugin_path, config).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to load plugin {plugin_path}: {e}");
                false
            }
        }
    }

    /// Like [`load_plugin`](Self::load_plugin), returning the registered
    /// name or the reason for failure.
    ///
    /// Nothing is registered unless validation and initialization both
    /// succeed. A plugin whose name is already registered replaces the old
    /// entry; the old instance is dropped without cleanup.
    pub async fn try_load_plugin(
        &mut self,
        plugin_path: &str,
        config: Option<PluginConfig>,
    ) -> Result<String, ManagerError> {
        info!("Loading plugin from: {plugin_path}");

        let mut plugin = self
            .catalog
            .instantiate(plugin_path, config.unwrap_or_default())?;
        let name = plugin.metadata().name.clone();

        plugin
            .validate_config()
            .map_err(|source| ManagerError::Validation {
                name: name.clone(),
                source,
            })?;

        guard_lifecycle(plugin.initialize(), |message| PluginError::init(message))
            .await
            .map_err(|source| ManagerError::Initialization {
                name: name.clone(),
                source,
            })?;

        if self
            .insert_plugin(plugin, PluginStatus::Enabled)
            .is_some()
        {
            warn!("Plugin {name} was already registered; previous instance replaced");
        }

        info!("Plugin loaded successfully: {name}");
        Ok(name)
    }

    /// Put an already-constructed plugin into the registry with `status`,
    /// without validating or initializing it.
    ///
    /// Returns the entry previously registered under the same name.
    pub fn insert_plugin(
        &mut self,
        plugin: Box<dyn ErasedPlugin>,
        status: PluginStatus,
    ) -> Option<LoadedPlugin> {
        let entry = LoadedPlugin { plugin, status };
        match self.position(entry.name()) {
            Some(index) => Some(std::mem::replace(&mut self.plugins[index], entry)),
            None => {
                self.plugins.push(entry);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Run cleanup and remove the plugin.
    ///
    /// The entry is removed even when cleanup fails; the failure is logged
    /// and reported by returning false.
    pub async fn unload_plugin(&mut self, plugin_name: &str) -> bool {
        match self.try_unload_plugin(plugin_name).await {
            Ok(()) => true,
            Err(ManagerError::NotFound(_)) => {
                warn!("Plugin not found: {plugin_name}");
                false
            }
            Err(e) => {
                error!("Failed to unload plugin {plugin_name}: {e}");
                false
            }
        }
    }

    pub async fn try_unload_plugin(&mut self, plugin_name: &str) -> Result<(), ManagerError> {
        let index = self
            .position(plugin_name)
            .ok_or_else(|| ManagerError::NotFound(plugin_name.to_string()))?;

        let mut entry = self.plugins.remove(index);
        let cleanup =
            guard_lifecycle(entry.plugin.cleanup(), |message| PluginError::cleanup(message)).await;
        drop(entry);

        match cleanup {
            Ok(()) => {
                info!("Plugin unloaded: {plugin_name}");
                Ok(())
            }
            Err(source) => Err(ManagerError::Cleanup {
                name: plugin_name.to_string(),
                source,
            }),
        }
    }

    /// Move a plugin to `Enabled`.
    ///
    /// Only a plugin that was never initialized (`Installed`) is initialized
    /// here; on failure it is left in `Error`. From any other status this is
    /// a plain status flip.
    pub async fn enable_plugin(&mut self, plugin_name: &str) -> bool {
        let Some(entry) = self.entry_mut(plugin_name) else {
            warn!("Plugin not found: {plugin_name}");
            return false;
        };

        match entry.status {
            PluginStatus::Enabled => return true,
            PluginStatus::Installed => {
                let initialized = guard_lifecycle(entry.plugin.initialize(), |message| {
                    PluginError::init(message)
                })
                .await;
                if let Err(e) = initialized {
                    entry.status = PluginStatus::Error;
                    error!("Failed to enable plugin {plugin_name}: {e}");
                    return false;
                }
            }
            _ => {}
        }

        entry.status = PluginStatus::Enabled;
        info!("Plugin enabled: {plugin_name}");
        true
    }

    /// Move a plugin to `Disabled`. Resources stay held; only execution is
    /// gated off. Disabling twice is fine.
    pub fn disable_plugin(&mut self, plugin_name: &str) -> bool {
        let Some(entry) = self.entry_mut(plugin_name) else {
            warn!("Plugin not found: {plugin_name}");
            return false;
        };

        entry.status = PluginStatus::Disabled;
        info!("Plugin disabled: {plugin_name}");
        true
    }

    /// Unload every registered plugin in registration order.
    ///
    /// Returns how many were cleaned up without error. The registry is
    /// empty afterwards either way.
    pub async fn cleanup_all(&mut self) -> usize {
        let names: Vec<String> = self.plugins.iter().map(|e| e.name().to_string()).collect();
        let mut clean = 0;
        for name in names {
            if self.unload_plugin(&name).await {
                clean += 1;
            }
        }
        clean
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Forward `args` to an enabled plugin and return its result unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound` and `NotEnabled` before the plugin is touched; `Execution`
    /// wrapping whatever the plugin returned.
    pub async fn execute_plugin(
        &mut self,
        plugin_name: &str,
        args: Vec<Value>,
    ) -> Result<Value, ManagerError> {
        let entry = self
            .entry_mut(plugin_name)
            .ok_or_else(|| ManagerError::NotFound(plugin_name.to_string()))?;

        if !entry.is_enabled() {
            return Err(ManagerError::NotEnabled {
                name: plugin_name.to_string(),
                status: entry.status,
            });
        }

        entry.plugin.execute(args).await.map_err(|source| {
            error!("Plugin execution failed {plugin_name}: {source}");
            ManagerError::Execution {
                name: plugin_name.to_string(),
                source,
            }
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_plugin(&self, plugin_name: &str) -> Option<&LoadedPlugin> {
        self.plugins.iter().find(|e| e.name() == plugin_name)
    }

    pub fn get_plugin_mut(&mut self, plugin_name: &str) -> Option<&mut LoadedPlugin> {
        self.entry_mut(plugin_name)
    }

    /// Info snapshots for every plugin, in registration order
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(LoadedPlugin::info).collect()
    }

    pub fn get_plugins_by_type(&self, plugin_type: PluginType) -> Vec<&LoadedPlugin> {
        self.plugins
            .iter()
            .filter(|e| e.metadata().plugin_type == plugin_type)
            .collect()
    }

    pub fn status_of(&self, plugin_name: &str) -> Option<PluginStatus> {
        self.get_plugin(plugin_name).map(LoadedPlugin::status)
    }

    /// Declared dependencies of `plugin_name` that are not registered.
    ///
    /// Informational only; loading never consults it.
    pub fn unmet_dependencies(&self, plugin_name: &str) -> Option<Vec<String>> {
        let entry = self.get_plugin(plugin_name)?;
        Some(
            entry
                .metadata()
                .dependencies
                .iter()
                .filter(|dep| self.get_plugin(dep).is_none())
                .cloned()
                .collect(),
        )
    }

    /// Registered plugin names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(LoadedPlugin::name).collect()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    // ------------------------------------------------------------------
    // Hooks and events
    // ------------------------------------------------------------------

    pub fn register_hook(&mut self, hook_name: impl Into<String>, callback: HookCallback) {
        self.hooks.register(hook_name, callback);
    }

    pub fn unregister_hook(&mut self, hook_name: &str, callback: &HookCallback) -> bool {
        self.hooks.unregister(hook_name, callback)
    }

    /// See [`HookRegistry::trigger`].
    pub async fn trigger_hook(&self, hook_name: &str, args: &[Value]) -> Vec<Value> {
        self.hooks.trigger(hook_name, args).await
    }

    pub fn hook_count(&self, hook_name: &str) -> usize {
        self.hooks.count(hook_name)
    }

    pub fn register_event_handler(&mut self, event_name: impl Into<String>, handler: EventHandler) {
        self.events.register(event_name, handler);
    }

    pub fn unregister_event_handler(&mut self, event_name: &str, handler: &EventHandler) -> bool {
        self.events.unregister(event_name, handler)
    }

    /// See [`EventBus::emit`].
    pub async fn emit_event(&self, event_name: &str, args: &[Value]) {
        debug!("Emitting event: {event_name}");
        self.events.emit(event_name, args).await;
    }

    pub fn event_handler_count(&self, event_name: &str) -> usize {
        self.events.count(event_name)
    }

    fn position(&self, plugin_name: &str) -> Option<usize> {
        self.plugins.iter().position(|e| e.name() == plugin_name)
    }

    fn entry_mut(&mut self, plugin_name: &str) -> Option<&mut LoadedPlugin> {
        self.plugins.iter_mut().find(|e| e.name() == plugin_name)
    }
}

/// Await a lifecycle step, turning a panic into the step's error.
async fn guard_lifecycle<F>(
    step: F,
    on_panic: fn(String) -> PluginError,
) -> Result<(), PluginError>
where
    F: Future<Output = Result<(), PluginError>>,
{
    AssertUnwindSafe(step)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(on_panic(format!("panicked: {}", panic_message(payload)))))
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}
