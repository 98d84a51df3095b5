//! Host run loop: load configured plugins, announce, wait, tear down

use ecosystem_core::{Config, ConfigError};
use ecosystem_plugins::PluginManager;
use serde_json::json;
use std::future::Future;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Event emitted once configured plugins are loaded.
pub const STARTED_EVENT: &str = "host.started";
/// Event emitted after shutdown is requested, before plugins are cleaned up.
pub const STOPPING_EVENT: &str = "host.stopping";

/// Outcome of loading every `[plugins.<name>]` section
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Sections whose plugin loaded
    pub loaded: Vec<String>,
    /// Sections whose plugin failed to load (reason already logged)
    pub failed: Vec<String>,
    /// Sections with `enabled = false`
    pub skipped: Vec<String>,
}

/// Load every enabled plugin section in `config` into `manager`.
///
/// A section that fails to load does not stop the others.
///
/// # Errors
///
/// Returns `ConfigError` when a section's reserved keys are malformed; no
/// plugin is loaded in that case.
pub async fn load_configured(
    manager: &mut PluginManager,
    config: &Config,
) -> Result<LoadSummary, ConfigError> {
    let sections = config.plugin_sections()?;
    let mut summary = LoadSummary::default();

    for section in sections {
        if !section.enabled {
            debug!("Plugin section {} disabled in config", section.name);
            summary.skipped.push(section.name);
            continue;
        }

        if manager.load_plugin(&section.module, Some(section.config)).await {
            summary.loaded.push(section.name);
        } else {
            warn!(
                "Plugin section {} ({}) was not loaded",
                section.name, section.module
            );
            summary.failed.push(section.name);
        }
    }

    Ok(summary)
}

/// Announce startup, wait for `cancel`, then unload everything.
///
/// Returns the number of plugins whose cleanup succeeded.
pub async fn run(manager: &mut PluginManager, cancel: CancellationToken) -> usize {
    info!("Running with {} plugin(s)", manager.len());
    manager
        .emit_event(STARTED_EVENT, &[json!({ "plugins": manager.names() })])
        .await;

    cancel.cancelled().await;

    info!("Shutdown requested, stopping {} plugin(s)", manager.len());
    manager.emit_event(STOPPING_EVENT, &[]).await;
    manager.cleanup_all().await
}

/// Wait for SIGINT (Ctrl+C) or, on unix, SIGTERM.
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = wait_for_signal(tokio::signal::ctrl_c(), "SIGINT (Ctrl+C)") => {}
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM");
                    }
                }
            }
            Err(e) => {
                warn!("Failed to create SIGTERM handler, listening for Ctrl+C only: {e}");
                wait_for_signal(tokio::signal::ctrl_c(), "SIGINT (Ctrl+C)").await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_signal(tokio::signal::ctrl_c(), "Ctrl+C").await;
}

/// Resolve when `listener` reports its signal.
///
/// A listener that fails to install never resolves, so other shutdown
/// sources raced against it keep working.
pub async fn wait_for_signal<F>(listener: F, signal_name: &str)
where
    F: Future<Output = io::Result<()>>,
{
    match listener.await {
        Ok(()) => info!("Received {signal_name}"),
        Err(e) => {
            error!("Failed to listen for {signal_name}: {e}");
            std::future::pending::<()>().await;
        }
    }
}
