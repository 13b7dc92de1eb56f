use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use super::{ApiResponse, internal_error, not_found, ok};
use crate::core::store::NewWorkflow;
use crate::interfaces::web::AppState;

pub async fn list_workflows(State(state): State<AppState>) -> ApiResponse {
    match state.store.list_workflows().await {
        Ok(workflows) => ok(json!({ "success": true, "workflows": workflows })),
        Err(e) => internal_error(e),
    }
}

pub async fn create_workflow(
    State(state): State<AppState>,
    Json(payload): Json<NewWorkflow>,
) -> ApiResponse {
    if payload.steps.is_empty() {
        return super::bad_request("A workflow needs at least one step");
    }
    match state.store.create_workflow(&payload).await {
        Ok(workflow) => ok(json!({ "success": true, "workflow": workflow })),
        Err(e) => internal_error(e),
    }
}

pub async fn get_workflow(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.get_workflow(&id).await {
        Ok(Some(workflow)) => ok(json!({ "success": true, "workflow": workflow })),
        Ok(None) => not_found(format!("Workflow not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NewWorkflow>,
) -> ApiResponse {
    if payload.steps.is_empty() {
        return super::bad_request("A workflow needs at least one step");
    }
    match state.store.update_workflow(&id, &payload).await {
        Ok(true) => ok(json!({ "success": true })),
        Ok(false) => not_found(format!("Workflow not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse {
    match state.store.delete_workflow(&id).await {
        Ok(true) => ok(json!({ "success": true })),
        Ok(false) => not_found(format!("Workflow not found: {id}")),
        Err(e) => internal_error(e),
    }
}
