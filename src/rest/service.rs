use axum::{Json, extract::State, http::Uri};
use serde_json::{Value, json};

use crate::common::error::RegistryError;
use crate::common::utils::elapsed_secs;
use crate::rest::error::ApiError;
use crate::server::rest_server::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Leader API - Service Discovery and Health Monitoring",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
    }))
}

pub async fn health(State(st): State<AppState>) -> Json<Value> {
    let now = st.registry.now();
    Json(json!({
        "status": "healthy",
        "instance_id": st.instance_id,
        "uptime_seconds": elapsed_secs(st.started_at, now),
        "timestamp": now.to_rfc3339(),
    }))
}

pub async fn get_environment(State(st): State<AppState>) -> Json<Value> {
    Json(st.environment.get_environment(st.registry.now()))
}

pub async fn get_stats(State(st): State<AppState>) -> Json<Value> {
    Json(json!({
        "registry": st.registry.statistics(),
        "sweeper": st.sweep_stats.counters(),
        "liveness_window_secs": st.registry.liveness_window().as_delta().num_seconds(),
    }))
}

pub async fn not_found(uri: Uri) -> ApiError {
    log::warn!("404 for path: {}", uri.path());
    RegistryError::NotFound(format!("Resource not found: {}", uri.path())).into()
}
