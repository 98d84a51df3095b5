//! Host process for the ecosystem plugin registry
//!
//! Turns resolved configuration into a populated [`PluginManager`] and keeps
//! it alive until shutdown is requested.
//!
//! [`PluginManager`]: ecosystem_plugins::PluginManager

pub mod host;
