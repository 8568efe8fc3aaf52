use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::{Value, json};

use crate::common::error::ValidationError;
use crate::rest::error::ApiError;
use crate::server::rest_server::AppState;

pub async fn im_alive(
    State(st): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let node = st.registry.announce_json(&body)?;
    Ok(Json(json!({
        "status": "received",
        "node": node,
    })))
}

pub async fn list_services(State(st): State<AppState>) -> Json<Value> {
    let services = st.registry.list();
    log::debug!("Listing {} node(s)", services.len());
    Json(json!({
        "total_count": services.len(),
        "services": services,
        "timestamp": st.registry.now().to_rfc3339(),
    }))
}

pub async fn discover_services(
    State(st): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let query = match body.get("query") {
        Some(Value::String(q)) => q.as_str(),
        Some(_) => return Err(ValidationError::single("query", "expected a string").into()),
        None => return Err(ValidationError::single("query", "missing").into()),
    };

    let results = st.registry.discover(query);
    Ok(Json(json!({
        "query": query,
        "total_count": results.len(),
        "results": results,
        "timestamp": st.registry.now().to_rfc3339(),
    })))
}

pub async fn lookup_services(
    State(st): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let keys = match body.get("instance_keys") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ValidationError::single("instance_keys", "expected strings only"))?,
        Some(_) => {
            return Err(ValidationError::single("instance_keys", "expected an array").into());
        }
        None => return Err(ValidationError::single("instance_keys", "missing").into()),
    };

    let results = st.registry.lookup(&keys);
    Ok(Json(json!({
        "total_count": results.len(),
        "results": results,
        "timestamp": st.registry.now().to_rfc3339(),
    })))
}
