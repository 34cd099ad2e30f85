//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::insights::InsightEngine;
use crate::producers::Journal;
use crate::timeline::TimelineHandle;
use std::sync::Arc;
use std::time::Instant;

pub use crate::config::ApiConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Write path for observations
    pub journal: Journal,
    /// Read access to the shared timeline
    pub timeline: TimelineHandle,
    /// Rule-based insight generator
    pub insights: Arc<InsightEngine>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(journal: Journal, insights: InsightEngine, config: ApiConfig) -> Self {
        Self {
            timeline: journal.timeline().clone(),
            journal,
            insights: Arc::new(insights),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
