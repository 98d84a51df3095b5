//! Core configuration and logging for the ecosystem plugin host
//!
//! This crate holds the pieces every ecosystem binary shares:
//! - Layered configuration resolution (`[core]` and `[plugins.<name>]` sections)
//! - Process-level tracing initialization
//! - Canonical home directory resolution

pub mod config;
pub mod home;
pub mod logging;

pub use config::{Config, ConfigError, ConfigOverrides, CoreConfig, PluginSection};

// Re-export toml for plugin config access
pub use toml;
