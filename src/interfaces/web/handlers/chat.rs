//! One-shot debug chat: run a single prompt against an inline agent
//! definition without creating a meeting or persisting anything.

use axum::Json;
use axum::extract::State;
use serde_json::json;

use super::{ApiResponse, internal_error, ok};
use crate::core::meeting::Agent;
use crate::interfaces::web::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    pub agent: InlineAgent,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct InlineAgent {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub provider: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequestBody>,
) -> ApiResponse {
    if payload.message.trim().is_empty() {
        return super::bad_request("Missing required field: message");
    }

    let agent = Agent {
        id: "debug".to_string(),
        name: payload.agent.name,
        role: payload.agent.role,
        avatar_url: None,
        persona: payload.agent.persona,
        prompt: payload.agent.prompt,
        style_id: String::new(),
        provider: payload.agent.provider,
        model: payload.agent.model,
        temperature: payload.agent.temperature,
    };

    match state
        .runner
        .one_shot_chat(&agent, &payload.message, payload.context.as_deref())
        .await
    {
        Ok(completion) => ok(json!({
            "success": true,
            "content": completion.text,
            "usage": completion.usage,
        })),
        Err(e) => internal_error(e),
    }
}
