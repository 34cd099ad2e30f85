//! Timeline Routes
//!
//! - GET /api/v1/timeline - Events newest first, optionally filtered by kind
//! - GET /api/v1/timeline/latest/:kind - Most recent event of a kind

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{TimelineQuery, TimelineResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::timeline::{Event, EventKind};

/// GET /api/v1/timeline
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimelineQuery>,
) -> ApiResult<Json<TimelineResponse>> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<EventKind>)
        .transpose()?;

    let response = state
        .timeline
        .read(|store| {
            let matching: Vec<&Event> = match kind {
                Some(kind) => store.of_kind(kind).collect(),
                None => store.iter().collect(),
            };
            let total = matching.len();
            let limit = query.limit.unwrap_or(total);

            TimelineResponse {
                version: store.version(),
                total,
                events: matching.into_iter().take(limit).cloned().collect(),
            }
        })
        .await;

    Ok(Json(response))
}

/// GET /api/v1/timeline/latest/:kind
pub async fn latest_of_kind(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Event>> {
    let kind: EventKind = kind.parse()?;

    state
        .timeline
        .last_of_kind(kind)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No {} events recorded", kind)))
}
