//! Meal & Mood Timeline
//!
//! This module provides the merged event timeline:
//!
//! - **types**: Event model (Event, EventKind, EventPayload, MoodState, ...)
//! - **classify**: Derived-metric classifiers (sleep quality, resting heart rate)
//! - **factory**: Event construction from producer records
//! - **store**: Time-ordered, deduplicating event store
//! - **handle**: Shared single-writer access with change notification
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Producer record → EventFactory → TimelineHandle (write lock) → TimelineStore
//!
//! Read Path:
//!   TimelineHandle (read lock) → &[Event] (newest first) → Correlator / InsightEngine
//! ```
//!
//! # Example
//!
//! ```rust
//! use mealmood::producers::{Meal, MoodEntry};
//! use mealmood::timeline::{EventFactory, EventKind, MoodSource, MoodState, TimelineStore};
//!
//! let factory = EventFactory::utc();
//! let mut store = TimelineStore::new();
//!
//! store.insert(factory.meal(&Meal::new(Some("Pizza".into()), "lunch", 1_000)).unwrap());
//! store.insert(factory.mood(&MoodEntry::new(MoodState::Sad, 60, 2_000, MoodSource::Manual)).unwrap());
//!
//! assert_eq!(store.last_of_kind(EventKind::Mood).unwrap().title(), "Sad");
//! ```

pub mod classify;
pub mod error;
pub mod factory;
pub mod handle;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use classify::{is_resting_heart_rate, sleep_quality};
pub use error::{TimelineError, TimelineResult};
pub use factory::EventFactory;
pub use handle::TimelineHandle;
pub use store::{InsertOutcome, TimelineStore};
pub use types::{
    Event, EventId, EventKind, EventPayload, HeartRateData, MoodSource, MoodState, SleepData,
    SleepQuality,
};
