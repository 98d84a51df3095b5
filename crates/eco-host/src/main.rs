//! eco-host - loads configured plugins and keeps them running until signalled

use anyhow::{Context, Result};
use clap::Parser;
use ecosystem_core::config::{ConfigOverrides, resolve_config};
use ecosystem_core::{home, logging};
use ecosystem_host::host;
use ecosystem_plugins::PluginManager;
use ecosystem_plugins::plugins::builtin_catalog;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// eco-host - plugin host for the ecosystem agent framework
#[derive(Parser, Debug)]
#[command(name = "eco-host")]
#[command(about = "Loads configured plugins and runs until interrupted")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Host name shown in logs (overrides config and ECO_HOST_NAME)
    #[arg(long, value_name = "NAME")]
    host_name: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logging::init_with_level(tracing::Level::DEBUG);
    } else {
        logging::init();
    }

    let home_dir = home::get_home_dir().context("Failed to determine home directory")?;
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;

    let overrides = ConfigOverrides {
        host_name: args.host_name.clone(),
        config_path: args.config.clone(),
    };
    let config = resolve_config(&overrides, &current_dir, &home_dir)
        .context("Failed to resolve configuration")?;

    info!("{} starting...", config.core.host_name);
    if let Some(config_path) = &args.config {
        info!("Loaded config from: {}", config_path.display());
    }

    let catalog = builtin_catalog();
    info!("Available modules: {}", catalog.list_modules().join(", "));
    let mut manager = PluginManager::with_catalog(catalog);

    let summary = host::load_configured(&mut manager, &config)
        .await
        .context("Invalid plugin configuration")?;
    if !summary.failed.is_empty() {
        warn!("Plugins not loaded: {}", summary.failed.join(", "));
    }

    let cancel_token = CancellationToken::new();
    let cancel_for_signals = cancel_token.clone();
    tokio::spawn(async move {
        host::wait_for_shutdown_signal().await;
        cancel_for_signals.cancel();
    });

    let clean = host::run(&mut manager, cancel_token).await;
    info!(
        "{} shutdown complete ({} plugin(s) cleaned up)",
        config.core.host_name, clean
    );
    Ok(())
}
