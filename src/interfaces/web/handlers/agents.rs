use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use super::{ApiResponse, internal_error, not_found, ok};
use crate::core::store::NewAgent;
use crate::interfaces::web::AppState;

pub async fn list_agents(State(state): State<AppState>) -> ApiResponse {
    match state.store.list_agents().await {
        Ok(agents) => ok(json!({ "success": true, "agents": agents })),
        Err(e) => internal_error(e),
    }
}

pub async fn create_agent(
    State(state): State<AppState>,
    Json(payload): Json<NewAgent>,
) -> ApiResponse {
    match state.store.create_agent(&payload).await {
        Ok(agent) => ok(json!({ "success": true, "agent": agent })),
        Err(e) => internal_error(e),
    }
}

pub async fn get_agent(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.get_agent(&id).await {
        Ok(Some(agent)) => ok(json!({ "success": true, "agent": agent })),
        Ok(None) => not_found(format!("Agent not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NewAgent>,
) -> ApiResponse {
    match state.store.update_agent(&id, &payload).await {
        Ok(true) => ok(json!({ "success": true })),
        Ok(false) => not_found(format!("Agent not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn delete_agent(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.delete_agent(&id).await {
        Ok(true) => ok(json!({ "success": true })),
        Ok(false) => not_found(format!("Agent not found: {id}")),
        Err(e) => internal_error(e),
    }
}
