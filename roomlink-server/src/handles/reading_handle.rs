use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use roomlink_api::models::{HistoryQuery, Reading};
use time::OffsetDateTime;

use crate::errors::{ApiError, ReadingError};
use crate::repositories::ReadingRepository;
use crate::services::{Device, StateCache, normalize};

pub const HISTORY_DEFAULT_LIMIT: u32 = 50;
pub const HISTORY_MAX_LIMIT: u32 = 1000;

#[derive(Clone)]
pub struct ReadingState {
    pub cache: Arc<StateCache>,
    pub device: Arc<dyn Device>,
    pub reading_repository: Arc<ReadingRepository>,
}

pub fn reading_router(reading_state: ReadingState) -> Router {
    Router::new()
        .route("/sensors", get(get_current_reading))
        .route("/sensors/live", get(get_live_reading))
        .route("/sensors/history", get(get_reading_history))
        .with_state(reading_state)
}

#[utoipa::path(
    get,
    path = "/sensors",
    tag = "sensors",
    responses(
        (status = 200, description = "Latest cached reading", body = Reading),
        (status = 503, description = "No data yet")
    )
)]
pub async fn get_current_reading(State(state): State<ReadingState>) -> Result<Json<Reading>, ApiError> {
    let reading = state.cache.get().await.ok_or(ReadingError::NoDataYet)?;

    Ok(Json(reading))
}

/// Reads the device directly, bypassing the poller. The result is neither
/// cached nor stored.
#[utoipa::path(
    get,
    path = "/sensors/live",
    tag = "sensors",
    responses(
        (status = 200, description = "Fresh reading from the device", body = Reading),
        (status = 502, description = "Device rejected the request"),
        (status = 503, description = "Device unreachable")
    )
)]
pub async fn get_live_reading(State(state): State<ReadingState>) -> Result<Json<Reading>, ApiError> {
    let payload = state.device.fetch_reading().await?;

    Ok(Json(normalize(&payload, OffsetDateTime::now_utc())))
}

#[utoipa::path(
    get,
    path = "/sensors/history",
    tag = "sensors",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Stored readings, newest first", body = Vec<Reading>),
        (status = 400, description = "Limit out of range"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_reading_history(
    State(state): State<ReadingState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let limit = query.limit.unwrap_or(HISTORY_DEFAULT_LIMIT);
    if limit == 0 || limit > HISTORY_MAX_LIMIT {
        return Err(ReadingError::InvalidLimit(limit, HISTORY_MAX_LIMIT).into());
    }

    let records = state.reading_repository.find_latest(i64::from(limit)).await?;

    Ok(Json(records.into_iter().map(Reading::from).collect()))
}
