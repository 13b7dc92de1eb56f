use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::handlers::{agents, chat, meetings, styles, workflows};

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{api_port}"),
        format!("http://localhost:{api_port}"),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_api_router(state: AppState, api_port: u16) -> Router {
    Router::new()
        .route(
            "/api/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/api/agents/{id}",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route(
            "/api/styles",
            get(styles::list_styles).post(styles::create_style),
        )
        .route(
            "/api/styles/{id}",
            get(styles::get_style)
                .put(styles::update_style)
                .delete(styles::delete_style),
        )
        .route(
            "/api/workflows",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/api/workflows/{id}",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route(
            "/api/meetings",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route("/api/meetings/{id}", get(meetings::get_meeting))
        .route("/api/meetings/{id}/messages", get(meetings::get_messages))
        .route("/api/meetings/{id}/start", post(meetings::start_meeting))
        .route("/api/meetings/{id}/run/next", post(meetings::run_next))
        .route("/api/meetings/{id}/run/resume", post(meetings::resume))
        .route("/api/chat", post(chat::chat))
        .layer(build_localhost_cors(api_port))
        .with_state(state)
}
