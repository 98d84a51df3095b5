pub mod callback;
pub mod catalog;
pub mod events;
pub mod hooks;
pub mod manager;
pub mod traits;
pub mod types;

pub use callback::{Callback, CallbackError};
pub use catalog::{DiscoveryError, FactoryFn, PluginCatalog, PluginFactory};
pub use events::{EventBus, EventHandler};
pub use hooks::{HookCallback, HookRegistry};
pub use manager::{LoadedPlugin, ManagerError, PluginManager};
pub use traits::{ErasedPlugin, Plugin};
pub use types::{
    ConfigField, PluginConfig, PluginError, PluginInfo, PluginMetadata, PluginStatus, PluginType,
};
