use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use super::{ApiResponse, internal_error, not_found, ok};
use crate::core::store::NewOutputStyle;
use crate::interfaces::web::AppState;

pub async fn list_styles(State(state): State<AppState>) -> ApiResponse {
    match state.store.list_output_styles().await {
        Ok(styles) => ok(json!({ "success": true, "styles": styles })),
        Err(e) => internal_error(e),
    }
}

pub async fn create_style(
    State(state): State<AppState>,
    Json(payload): Json<NewOutputStyle>,
) -> ApiResponse {
    match state.store.create_output_style(&payload).await {
        Ok(style) => ok(json!({ "success": true, "style": style })),
        Err(e) => internal_error(e),
    }
}

pub async fn get_style(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.get_output_style(&id).await {
        Ok(Some(style)) => ok(json!({ "success": true, "style": style })),
        Ok(None) => not_found(format!("Output style not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn update_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NewOutputStyle>,
) -> ApiResponse {
    match state.store.update_output_style(&id, &payload).await {
        Ok(true) => ok(json!({ "success": true })),
        Ok(false) => not_found(format!("Output style not found: {id}")),
        Err(e) => internal_error(e),
    }
}

pub async fn delete_style(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    match state.store.delete_output_style(&id).await {
        Ok(true) => ok(json!({ "success": true })),
        Ok(false) => not_found(format!("Output style not found: {id}")),
        Err(e) => internal_error(e),
    }
}
