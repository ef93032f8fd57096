use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use roomlink_api::models::{HealthResponse, PollerStatus};
use tokio::sync::watch;

use crate::services::{Fanout, StateCache};

#[derive(Clone)]
pub struct HealthState {
    pub status: watch::Receiver<PollerStatus>,
    pub fanout: Arc<Fanout>,
    pub cache: Arc<StateCache>,
}

pub fn health_router(health_state: HealthState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .with_state(health_state)
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Poller status and subscriber count", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Json<HealthResponse> {
    let poller = state.status.borrow().clone();

    Json(HealthResponse {
        poller,
        subscribers: state.fanout.subscriber_count().await,
        has_reading: !state.cache.is_empty().await,
    })
}
