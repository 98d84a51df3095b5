//! Plugin registry for the ecosystem agent framework
//!
//! [`PluginManager`] owns the installed plugins and drives each one through
//! initialize → enabled/disabled → cleanup. Plugins are located through a
//! [`PluginCatalog`] of factories keyed by module path, and two independent
//! extension mechanisms sit beside the registry:
//!
//! - hooks ([`HookRegistry`]): ordered callbacks whose results are collected
//! - events ([`EventBus`]): ordered handlers run for side effects only
//!
//! Every manager is an ordinary value; there is no process-wide instance.

pub mod plugin;
pub mod plugins;

pub use plugin::{
    Callback, CallbackError, ConfigField, DiscoveryError, ErasedPlugin, EventBus, EventHandler,
    HookCallback, HookRegistry, LoadedPlugin, ManagerError, Plugin, PluginCatalog, PluginConfig,
    PluginError, PluginFactory, PluginInfo, PluginManager, PluginMetadata, PluginStatus,
    PluginType,
};
