//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::insights::Insight;
use crate::producers::{IngestSummary, Observation};
use crate::timeline::Event;
use serde::{Deserialize, Serialize};

// ============================================
// EVENT DTOs
// ============================================

/// Single observation response
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// "created" or "duplicate"
    pub status: String,
    pub event: Event,
}

/// Batch observation request
#[derive(Debug, Deserialize)]
pub struct BatchEventsRequest {
    pub observations: Vec<Observation>,
}

/// Batch observation response
#[derive(Debug, Serialize)]
pub struct BatchEventsResponse {
    /// "ok" or "partial"
    pub status: String,
    #[serde(flatten)]
    pub summary: IngestSummary,
}

// ============================================
// TIMELINE DTOs
// ============================================

/// Timeline query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    /// Restrict to one kind: meal, mood, sleep, heart_metric
    pub kind: Option<String>,
    /// Maximum number of events, newest first
    pub limit: Option<usize>,
}

/// Timeline response
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    /// Store version the events were read at
    pub version: u64,
    /// Matching events before the limit was applied
    pub total: usize,
    pub events: Vec<Event>,
}

// ============================================
// INSIGHT DTOs
// ============================================

/// Full insight list
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    /// "ready" or "insufficient_data"
    pub status: String,
    pub event_count: usize,
    pub insights: Vec<Insight>,
}

/// Single best insight
#[derive(Debug, Serialize)]
pub struct BestInsightResponse {
    pub insight: Option<Insight>,
}

/// Result of annotating meals
#[derive(Debug, Serialize)]
pub struct AnnotateResponse {
    pub annotated: usize,
    pub version: u64,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub events: usize,
    pub timeline_version: u64,
    pub uptime_seconds: u64,
    pub version: String,
}
