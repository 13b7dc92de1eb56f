pub mod agents;
pub mod chat;
pub mod meetings;
pub mod styles;
pub mod workflows;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

pub(crate) type ApiResponse = (StatusCode, Json<Value>);

pub(crate) fn ok(value: Value) -> ApiResponse {
    (StatusCode::OK, Json(value))
}

pub(crate) fn not_found(error: impl ToString) -> ApiResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": error.to_string() })),
    )
}

pub(crate) fn bad_request(error: impl ToString) -> ApiResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": error.to_string() })),
    )
}

pub(crate) fn internal_error(error: impl ToString) -> ApiResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": error.to_string() })),
    )
}

/// The runner reports state violations and missing entities as plain errors;
/// map the well-known ones onto HTTP statuses the way the original API did.
pub(crate) fn runner_error(error: anyhow::Error) -> ApiResponse {
    let msg = error.to_string();
    if msg.contains("not found") {
        not_found(msg)
    } else if msg.starts_with("Meeting") {
        bad_request(msg)
    } else {
        internal_error(msg)
    }
}
