//! Plugin catalog: resolves module paths to plugin factories
//!
//! Hosts register factories under a module path (for example
//! `"builtin.echo"`). Loading a path requires exactly one factory under it;
//! zero or several are discovery errors.

use super::{ErasedPlugin, Plugin, PluginConfig, PluginError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A factory function that creates a plugin instance from its configuration
pub type FactoryFn =
    Arc<dyn Fn(PluginConfig) -> Result<Box<dyn ErasedPlugin>, PluginError> + Send + Sync>;

/// A factory that can create a plugin instance
#[derive(Clone)]
pub struct PluginFactory {
    /// Implementation name, reported when a path is ambiguous
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function: takes the plugin config, returns a plugin
    pub create: FactoryFn,
}

impl PluginFactory {
    /// Build a factory from a constructor for a concrete plugin type.
    pub fn new<P, F>(name: impl Into<String>, description: impl Into<String>, ctor: F) -> Self
    where
        P: Plugin + 'static,
        F: Fn(PluginConfig) -> Result<P, PluginError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            create: Arc::new(move |config| {
                ctor(config).map(|plugin| Box::new(plugin) as Box<dyn ErasedPlugin>)
            }),
        }
    }
}

impl std::fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginFactory")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("create", &"<factory_fn>")
            .finish()
    }
}

/// Discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no plugin found in module '{path}'")]
    NotFound { path: String },

    #[error("module '{path}' provides {} plugins ({}); expected exactly one", candidates.len(), candidates.join(", "))]
    Ambiguous {
        path: String,
        candidates: Vec<String>,
    },

    #[error("failed to construct plugin from module '{path}': {source}")]
    Construct {
        path: String,
        #[source]
        source: PluginError,
    },
}

/// Registry of plugin factories keyed by module path
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    modules: HashMap<String, Vec<PluginFactory>>,
}

impl PluginCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Add a factory under a module path.
    ///
    /// Factories accumulate: registering a second factory under the same
    /// path makes that path ambiguous.
    pub fn register(&mut self, path: impl Into<String>, factory: PluginFactory) {
        self.modules.entry(path.into()).or_default().push(factory);
    }

    /// Find the single factory for a module path.
    ///
    /// # Errors
    ///
    /// `DiscoveryError::NotFound` for an unknown or empty path,
    /// `DiscoveryError::Ambiguous` when more than one factory is registered.
    pub fn resolve(&self, path: &str) -> Result<&PluginFactory, DiscoveryError> {
        match self.modules.get(path).map(Vec::as_slice) {
            None | Some([]) => Err(DiscoveryError::NotFound {
                path: path.to_string(),
            }),
            Some([factory]) => Ok(factory),
            Some(factories) => Err(DiscoveryError::Ambiguous {
                path: path.to_string(),
                candidates: factories.iter().map(|f| f.name.clone()).collect(),
            }),
        }
    }

    /// Resolve a path and construct the plugin with `config`.
    pub fn instantiate(
        &self,
        path: &str,
        config: PluginConfig,
    ) -> Result<Box<dyn ErasedPlugin>, DiscoveryError> {
        let factory = self.resolve(path)?;
        (factory.create)(config).map_err(|source| DiscoveryError::Construct {
            path: path.to_string(),
            source,
        })
    }

    /// List registered module paths, sorted
    pub fn list_modules(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modules.keys().map(|s| s.as_str()).collect();
        paths.sort_unstable();
        paths
    }

    pub fn has_module(&self, path: &str) -> bool {
        self.modules.get(path).is_some_and(|f| !f.is_empty())
    }

    /// Number of module paths
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::echo::EchoPlugin;
    use serde_json::json;

    fn echo_factory(name: &str) -> PluginFactory {
        PluginFactory::new(name, "Echo for tests", |config| Ok(EchoPlugin::new(config)))
    }

    #[test]
    fn test_catalog_new() {
        let catalog = PluginCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn test_resolve_single_factory() {
        let mut catalog = PluginCatalog::new();
        catalog.register("test.echo", echo_factory("Echo"));

        assert!(catalog.has_module("test.echo"));
        assert_eq!(catalog.resolve("test.echo").unwrap().name, "Echo");
    }

    #[test]
    fn test_resolve_unknown_path() {
        let catalog = PluginCatalog::new();
        let err = catalog.resolve("missing.module").unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound { .. }));
        assert!(err.to_string().contains("missing.module"));
    }

    #[test]
    fn test_resolve_ambiguous_path() {
        let mut catalog = PluginCatalog::new();
        catalog.register("test.pair", echo_factory("First"));
        catalog.register("test.pair", echo_factory("Second"));

        match catalog.resolve("test.pair").unwrap_err() {
            DiscoveryError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, vec!["First", "Second"]);
            }
            other => panic!("expected ambiguity, got {other}"),
        }
    }

    #[test]
    fn test_instantiate_passes_config() {
        let mut catalog = PluginCatalog::new();
        catalog.register("test.echo", echo_factory("Echo"));

        let mut config = PluginConfig::new();
        config.insert("greeting".to_string(), json!("hey"));
        let plugin = catalog.instantiate("test.echo", config).unwrap();
        assert_eq!(plugin.get_config("greeting"), Some(&json!("hey")));
    }

    #[test]
    fn test_instantiate_constructor_failure() {
        let mut catalog = PluginCatalog::new();
        catalog.register(
            "test.broken",
            PluginFactory::new("Broken", "Never builds", |_config| {
                Err::<EchoPlugin, _>(PluginError::init("missing runtime"))
            }),
        );

        let err = catalog.instantiate("test.broken", PluginConfig::new()).err().unwrap();
        assert!(matches!(err, DiscoveryError::Construct { .. }));
        assert!(err.to_string().contains("missing runtime"));
    }

    #[test]
    fn test_list_modules_sorted() {
        let mut catalog = PluginCatalog::new();
        catalog.register("b.mod", echo_factory("B"));
        catalog.register("a.mod", echo_factory("A"));
        assert_eq!(catalog.list_modules(), vec!["a.mod", "b.mod"]);
    }
}
