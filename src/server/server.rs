use std::sync::Arc;

use crate::common::config::load_server_config;
use crate::registry::sweeper::ExpirySweeper;
use crate::server::loader::{load_environment, load_system_registry};
use crate::server::rest_server::{AppState, rest_server_start};

pub async fn server_start(config_path: Option<&str>) -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Leader API service...");

    let server_config = Arc::new(load_server_config(config_path)?);
    let registry = Arc::new(load_system_registry(&server_config).inspect_err(|e| {
        log::error!("Invalid configuration: {}", e);
    })?);
    let environment = Arc::new(load_environment(&server_config).inspect_err(|e| {
        log::error!("Invalid environment: {}", e);
    })?);

    let sweeper = ExpirySweeper::new(Arc::clone(&registry));
    let sweep_stats = sweeper.stats();
    let sweeper_task = sweeper.spawn(server_config.sweep_interval());
    log::info!(
        "Expiry sweeper running every {}s",
        server_config.sweep_interval_secs
    );

    let state = AppState::new(server_config, registry, environment, sweep_stats);
    let served = rest_server_start(state, shutdown_signal()).await;

    sweeper_task.abort();
    log::info!("Leader API service stopped");
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
