mod handlers;
mod router;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::core::runner::MeetingRunner;
use crate::core::store::MeetingStore;

#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<MeetingStore>,
    pub(crate) runner: Arc<MeetingRunner>,
}

impl AppState {
    pub fn new(store: Arc<MeetingStore>, runner: Arc<MeetingRunner>) -> Self {
        Self { store, runner }
    }
}

pub async fn serve(host: &str, port: u16, state: AppState) -> Result<()> {
    let addr = format!("{host}:{port}");
    let app = router::build_api_router(state, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Quorum API running at http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
