use std::path::PathBuf;
use std::sync::Arc;

use airwatch::config::AirWatchConfig;
use airwatch::{FallbackTable, RemoteClient, ResolutionPolicy, ViewStateController, telemetry, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => AirWatchConfig::load_from_path(Some(PathBuf::from(path)))?,
        None => AirWatchConfig::load()?,
    };
    telemetry::init(&config.logging)?;

    info!("Starting AirWatch v{}", airwatch::VERSION);
    info!(
        "Backend {} (mode {:?}, timeout {}s)",
        config.backend.base_url, config.backend.mode, config.backend.timeout_seconds
    );

    let client = RemoteClient::new(&config.backend).context("Failed to create backend client")?;
    let policy = ResolutionPolicy::new(Arc::new(client), FallbackTable::new());
    let controller = Arc::new(ViewStateController::new(
        policy,
        &config.controller,
        config.backend.mode,
    ));

    controller.mount().await;
    let view = controller.snapshot();
    match (&view.error, &view.warning) {
        (Some(error), _) => warn!("Initial load failed: {}", error),
        (None, Some(warning)) => warn!("{}", warning),
        (None, None) => info!("Initial load complete"),
    }

    let _health_monitor =
        controller.spawn_health_monitor(config.controller.health_check_interval());
    let _auto_refresh = config
        .controller
        .auto_refresh_interval()
        .map(|interval| controller.spawn_auto_refresh(interval));

    web::run(&config.web, controller, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutting down");
    })
    .await
}
