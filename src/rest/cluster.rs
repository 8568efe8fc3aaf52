use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::registry::discovery::Readiness;
use crate::server::rest_server::AppState;

fn status_label(readiness: &Readiness) -> &'static str {
    if readiness.ready { "ready" } else { "not_ready" }
}

pub async fn get_ready(State(st): State<AppState>) -> Json<Value> {
    let readiness = st.registry.cluster_ready();
    Json(json!({ "status": status_label(&readiness) }))
}

pub async fn get_nodes(State(st): State<AppState>) -> Json<Value> {
    let readiness = st.registry.cluster_ready();
    Json(json!({
        "status": status_label(&readiness),
        "data": {
            "nodes_summary": readiness.nodes_summary,
            "required_nodes": readiness.required_nodes,
        },
    }))
}

pub async fn get_cluster_info(State(st): State<AppState>) -> Json<Readiness> {
    Json(st.registry.cluster_ready())
}
