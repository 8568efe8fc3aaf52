use axum::{Router, routing::{get, post}};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::common::config::ServerConfig;
use crate::registry::Registry;
use crate::registry::environment::EnvironmentReporter;
use crate::registry::sweeper::SweepStats;
use crate::rest::{
    cluster::{get_cluster_info, get_nodes, get_ready},
    nodes::{discover_services, im_alive, list_services, lookup_services},
    service::{get_environment, get_stats, health, not_found, root},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<Registry>,
    pub environment: Arc<EnvironmentReporter>,
    pub sweep_stats: Arc<SweepStats>,
    /// Fresh on every process start, so callers can tell a restarted leader.
    pub instance_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        registry: Arc<Registry>,
        environment: Arc<EnvironmentReporter>,
        sweep_stats: Arc<SweepStats>,
    ) -> Self {
        let started_at = registry.now();
        Self {
            config,
            registry,
            environment,
            sweep_stats,
            instance_id: Uuid::new_v4(),
            started_at,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/v1/imalive", post(im_alive))
        .route("/v1/list", get(list_services))
        .route("/v1/discover", post(discover_services))
        .route("/v1/lookup", post(lookup_services))
        .route("/v1/getenv", get(get_environment))
        .route("/v1/clusterinfo", get(get_cluster_info))
        .route("/v1/stats", get(get_stats))
        .route("/api/cluster/ready", get(get_ready))
        .route("/api/cluster/nodes", get(get_nodes))
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn rest_server_start<F>(state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Leader API listening on {}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            log::error!("Failed to start server: {}", e);
            anyhow::anyhow!("Server error: {}", e)
        })?;

    Ok(())
}
