//! envmon server entry point
//!
//! Usage: `envmon-server [config.json]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use envmon_core::config::Config;
use envmon_core::dashboard::Dashboard;
use envmon_core::poller::Poller;
use envmon_server::{feeder, router, AppState};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,envmon_core=debug,envmon_server=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let (config, config_path) = Config::resolve(std::env::args_os().nth(1).map(PathBuf::from))
        .context("Failed to load configuration")?;
    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let (readings, state) = config
        .storage
        .open(config.memory_capacity)
        .context("Failed to open stores")?;
    let dashboard = Dashboard::new(readings, state, config.dashboard_settings()?);

    let cancel = CancellationToken::new();
    let feeder = config
        .demo
        .enabled
        .then(|| feeder::spawn(dashboard.clone(), &config.demo, cancel.clone()));
    let poller = Poller::spawn(dashboard.clone(), config.poll_interval(), cancel.clone());

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    let app = router(AppState::new(dashboard, poller.subscribe()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel.cancel();
    poller.join().await;
    if let Some(handle) = feeder {
        if let Err(e) = handle.await {
            warn!("Demo feed ended abnormally: {}", e);
        }
    }
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
