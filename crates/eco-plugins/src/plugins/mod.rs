//! Plugins shipped with the host

pub mod echo;

pub use echo::EchoPlugin;

use crate::plugin::PluginCatalog;

/// Register every built-in plugin under its module path.
pub fn register_builtin(catalog: &mut PluginCatalog) {
    catalog.register(EchoPlugin::MODULE, EchoPlugin::factory());
}

/// A catalog holding only the built-in plugins
pub fn builtin_catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    register_builtin(&mut catalog);
    catalog
}
