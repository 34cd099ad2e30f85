//! Event Routes
//!
//! Endpoints for recording observations on the timeline.
//!
//! - POST /api/v1/events - Single observation
//! - POST /api/v1/events/batch - Batch of observations

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{BatchEventsRequest, BatchEventsResponse, EventResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::producers::Observation;
use crate::timeline::InsertOutcome;

/// Largest accepted batch
pub const MAX_BATCH_SIZE: usize = 10_000;

/// POST /api/v1/events
///
/// Record one meal, mood entry or health sample.
/// 201 when stored, 200 when skipped as a duplicate.
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Json(observation): Json<Observation>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let (event, outcome) = state.journal.record(observation).await?;

    let (status, label) = match outcome {
        InsertOutcome::Inserted => (StatusCode::CREATED, "created"),
        InsertOutcome::Duplicate => (StatusCode::OK, "duplicate"),
    };

    Ok((
        status,
        Json(EventResponse {
            status: label.to_string(),
            event,
        }),
    ))
}

/// POST /api/v1/events/batch
///
/// Record many observations in a single request.
pub async fn record_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchEventsRequest>,
) -> ApiResult<(StatusCode, Json<BatchEventsResponse>)> {
    validate_batch(&req.observations)?;

    let summary = state.journal.ingest_batch(req.observations).await;

    let status = if summary.errors.is_empty() {
        StatusCode::CREATED
    } else if summary.accepted + summary.duplicates > 0 {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::BAD_REQUEST
    };

    let status_str = if summary.errors.is_empty() { "ok" } else { "partial" };

    Ok((
        status,
        Json(BatchEventsResponse {
            status: status_str.to_string(),
            summary,
        }),
    ))
}

fn validate_batch(observations: &[Observation]) -> ApiResult<()> {
    if observations.is_empty() {
        return Err(ApiError::Validation("Empty batch".to_string()));
    }

    if observations.len() > MAX_BATCH_SIZE {
        return Err(ApiError::Validation(format!(
            "Batch size exceeds maximum of {} observations",
            MAX_BATCH_SIZE
        )));
    }

    Ok(())
}
