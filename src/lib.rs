//! # MealMood
//!
//! Meal & Mood Timeline - merges logged meals, mood check-ins and health
//! samples into one time-ordered timeline and surfaces simple rule-based
//! insights about how meals relate to mood and sleep.
//!
//! ## Features
//!
//! - **Unified timeline**: Newest-first event store with re-ingest deduplication
//! - **Single-writer funnel**: Shared handle with change notification
//! - **Windowed correlation**: Meals related to the moods and sleep that follow
//! - **Insights**: "After eating pizza, you often feel sad"
//! - **Producers**: Image classifier, mood detector, health source and record sync seams
//!
//! ## Modules
//!
//! - [`timeline`]: Event model, factory and store
//! - [`insights`]: Correlator and insight engine
//! - [`producers`]: Producer records, collaborator traits, journal, CSV import
//! - [`sync`]: HTTP record sync
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use mealmood::insights::InsightEngine;
//! use mealmood::producers::{HealthSample, Journal, Meal, MoodEntry};
//! use mealmood::timeline::{EventFactory, MoodSource, MoodState, TimelineHandle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let journal = Journal::new(TimelineHandle::new(), EventFactory::utc());
//!     let t0 = 1_747_648_800_000;
//!     let hour = 3_600_000;
//!
//!     journal.record(Meal::new(Some("Pizza".into()), "dinner", t0).into()).await?;
//!     journal.record(MoodEntry::new(MoodState::Angry, 70, t0 + hour / 2, MoodSource::Manual).into()).await?;
//!     journal.record(MoodEntry::new(MoodState::Sad, 55, t0 + 2 * hour, MoodSource::Manual).into()).await?;
//!     journal.record(HealthSample::sleep(t0 + 9 * hour, t0 + 13 * hour).into()).await?;
//!
//!     let events = journal.timeline().snapshot().await;
//!     for insight in InsightEngine::default().generate(&events) {
//!         println!("{}", insight.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod insights;
pub mod producers;
pub mod sync;
pub mod timeline;

// Re-export top-level types for convenience
pub use timeline::{
    Event, EventFactory, EventId, EventKind, EventPayload, InsertOutcome, MoodSource, MoodState,
    SleepQuality, TimelineError, TimelineHandle, TimelineResult, TimelineStore,
};

pub use insights::{Correlator, Insight, InsightConfig, InsightEngine, Pattern, Window};

pub use producers::{
    Classification, CsvImporter, HealthSample, HealthSource, ImageClassifier, IngestSummary,
    Journal, Meal, MoodDetector, MoodEntry, Observation, ProducerError, RecordSync,
};

pub use sync::{HttpRecordSync, SyncConfig, SyncError};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, TimelineConfig};
