//! Insight Routes
//!
//! - GET /api/v1/insights - All meal/mood and meal/sleep insights
//! - GET /api/v1/insights/best - The single most recent insight
//! - POST /api/v1/insights/annotate - Write insights onto meal events

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{AnnotateResponse, BestInsightResponse, InsightsResponse};
use crate::api::state::AppState;

/// GET /api/v1/insights
pub async fn list_insights(State(state): State<Arc<AppState>>) -> Json<InsightsResponse> {
    let engine = &state.insights;

    let response = state
        .timeline
        .read(|store| {
            let events = store.all();
            let status = if engine.has_enough_data(events) {
                "ready"
            } else {
                "insufficient_data"
            };

            InsightsResponse {
                status: status.to_string(),
                event_count: events.len(),
                insights: engine.generate(events),
            }
        })
        .await;

    Json(response)
}

/// GET /api/v1/insights/best
pub async fn best_insight(State(state): State<Arc<AppState>>) -> Json<BestInsightResponse> {
    let engine = &state.insights;
    let insight = state
        .timeline
        .read(|store| engine.best_insight(store.all()))
        .await;

    Json(BestInsightResponse { insight })
}

/// POST /api/v1/insights/annotate
pub async fn annotate(State(state): State<Arc<AppState>>) -> Json<AnnotateResponse> {
    let engine = &state.insights;
    let (annotated, version) = state
        .timeline
        .write(|store| (engine.annotate(store), store.version()))
        .await;

    Json(AnnotateResponse { annotated, version })
}
