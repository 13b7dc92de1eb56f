use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use super::{ApiResponse, internal_error, not_found, ok, runner_error};
use crate::core::store::NewMeeting;
use crate::interfaces::web::AppState;

pub async fn list_meetings(State(state): State<AppState>) -> ApiResponse {
    match state.store.list_meetings().await {
        Ok(meetings) => ok(json!({ "success": true, "meetings": meetings })),
        Err(e) => internal_error(e),
    }
}

pub async fn create_meeting(
    State(state): State<AppState>,
    Json(payload): Json<NewMeeting>,
) -> ApiResponse {
    match state.store.get_workflow(&payload.workflow_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return super::bad_request(format!(
                "Workflow not configured: {}",
                payload.workflow_id
            ));
        }
        Err(e) => return internal_error(e),
    }
    match state.store.create_meeting(&payload).await {
        Ok(meeting) => ok(json!({ "success": true, "meeting": meeting })),
        Err(e) => internal_error(e),
    }
}

pub async fn get_meeting(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.get_meeting(&id).await {
        Ok(Some(meeting)) => ok(json!({ "success": true, "meeting": meeting })),
        Ok(None) => not_found(format!("Meeting not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn get_messages(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.list_messages(&id).await {
        Ok(messages) => ok(json!({ "success": true, "messages": messages })),
        Err(e) => internal_error(e),
    }
}

pub async fn start_meeting(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.runner.start(&id).await {
        Ok(meeting) => ok(json!({ "success": true, "meeting": meeting })),
        Err(e) => runner_error(e),
    }
}

pub async fn run_next(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.runner.run_next(&id).await {
        Ok(report) => ok(json!({
            "success": true,
            "current_step": report.current_step,
            "total_steps": report.total_steps,
            "status": report.status,
            "executed_step": report.executed_step,
            "messages": report.messages,
        })),
        Err(e) => runner_error(e),
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ResumeRequest {
    pub whiteboard: Option<String>,
}

pub async fn resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: axum::body::Bytes,
) -> ApiResponse {
    // An empty or malformed body just means "resume without edits".
    let whiteboard = serde_json::from_slice::<ResumeRequest>(&body)
        .ok()
        .and_then(|p| p.whiteboard);
    match state.runner.resume(&id, whiteboard).await {
        Ok(report) => ok(json!({
            "success": true,
            "current_step": report.current_step,
            "total_steps": report.total_steps,
            "status": report.status,
            "executed_step": report.executed_step,
            "messages": report.messages,
        })),
        Err(e) => runner_error(e),
    }
}
