//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// How long readiness waits for the timeline lock
const READY_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 once the timeline can be read.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match timeline_len(&state).await {
        Some(_) => StatusCode::OK,
        None => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with timeline details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let events = timeline_len(&state).await;

    Json(HealthResponse {
        status: if events.is_some() { "healthy" } else { "degraded" }.to_string(),
        events: events.unwrap_or(0),
        timeline_version: state.timeline.version(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Timeline size, or None if the lock is held too long
async fn timeline_len(state: &AppState) -> Option<usize> {
    tokio::time::timeout(READY_LOCK_TIMEOUT, state.timeline.len())
        .await
        .ok()
}
