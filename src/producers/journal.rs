//! Journal
//!
//! The write path from producers into the timeline. Each finalized record is
//! turned into an event by the [`EventFactory`] and inserted through the
//! shared [`TimelineHandle`]. Meals and mood entries are additionally pushed
//! to the remote store on a background task; sync failures are logged and
//! never reach the caller.

use super::{
    HealthSource, ImageClassifier, Meal, MoodDetector, MoodEntry, Observation, ProducerError,
    RecordSync,
};
use crate::timeline::{Event, EventFactory, InsertOutcome, MoodSource, TimelineHandle, TimelineResult};
use serde::Serialize;
use std::sync::Arc;

/// Outcome counts for a batch of observations
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RejectedObservation>,
}

/// An observation that could not be turned into an event
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RejectedObservation {
    /// Position in the submitted batch
    pub index: usize,
    pub error: String,
}

/// Producer-facing entry point to the timeline
#[derive(Clone)]
pub struct Journal {
    timeline: TimelineHandle,
    factory: EventFactory,
    sync: Option<Arc<dyn RecordSync>>,
}

impl Journal {
    pub fn new(timeline: TimelineHandle, factory: EventFactory) -> Self {
        Self {
            timeline,
            factory,
            sync: None,
        }
    }

    /// Push meals and mood entries to a remote store after insert
    pub fn with_sync(mut self, sync: Arc<dyn RecordSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn timeline(&self) -> &TimelineHandle {
        &self.timeline
    }

    pub fn factory(&self) -> EventFactory {
        self.factory
    }

    /// Convert and insert one observation.
    ///
    /// Returns the constructed event and whether it was stored or skipped as
    /// a duplicate. Construction errors leave the timeline untouched.
    pub async fn record(&self, observation: Observation) -> TimelineResult<(Event, InsertOutcome)> {
        let event = self.factory.observation(&observation)?;
        let outcome = self.timeline.insert(event.clone()).await;

        tracing::debug!(
            event_id = %event.id(),
            kind = %event.kind(),
            timestamp = event.timestamp(),
            outcome = ?outcome,
            "Recorded observation"
        );

        if outcome.is_inserted() {
            self.spawn_sync(observation);
        }
        Ok((event, outcome))
    }

    /// Classify a meal photo and record the meal
    pub async fn log_meal_photo(
        &self,
        classifier: &dyn ImageClassifier,
        image: &[u8],
        description: impl Into<String>,
        timestamp: i64,
    ) -> TimelineResult<(Event, InsertOutcome)> {
        let classification = classifier.classify(image).await;
        tracing::debug!(
            label = ?classification.label,
            confidence = ?classification.confidence,
            "Classified meal photo"
        );

        let meal = Meal::new(classification.label, description, timestamp);
        self.record(meal.into()).await
    }

    /// Detect the current mood and record it as an automatic entry
    pub async fn log_detected_mood(
        &self,
        detector: &dyn MoodDetector,
        intensity: u8,
        timestamp: i64,
    ) -> TimelineResult<(Event, InsertOutcome)> {
        let mood = detector.detect().await;
        let entry = MoodEntry::new(mood, intensity, timestamp, MoodSource::Automatic);
        self.record(entry.into()).await
    }

    /// Pull the latest samples from a health source and insert them.
    ///
    /// Re-running with the same samples only counts duplicates.
    pub async fn refresh_health(
        &self,
        source: &dyn HealthSource,
    ) -> Result<IngestSummary, ProducerError> {
        let samples = source.fetch().await?;
        let fetched = samples.len();

        let summary = self
            .ingest_batch(samples.into_iter().map(Observation::from).collect())
            .await;

        tracing::info!(
            source = source.name(),
            fetched,
            accepted = summary.accepted,
            duplicates = summary.duplicates,
            rejected = summary.rejected,
            "Refreshed health data"
        );
        Ok(summary)
    }

    /// Convert and insert many observations under one write lock.
    ///
    /// Invalid observations are reported by index and skipped.
    pub async fn ingest_batch(&self, observations: Vec<Observation>) -> IngestSummary {
        let mut summary = IngestSummary::default();
        let mut accepted = Vec::with_capacity(observations.len());

        for (index, observation) in observations.into_iter().enumerate() {
            match self.factory.observation(&observation) {
                Ok(event) => accepted.push((observation, event)),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Rejected observation");
                    summary.rejected += 1;
                    summary.errors.push(RejectedObservation {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }

        let (observations, events): (Vec<Observation>, Vec<Event>) = accepted.into_iter().unzip();
        let outcomes = self.timeline.insert_all(events).await;

        for (observation, outcome) in observations.into_iter().zip(outcomes) {
            match outcome {
                InsertOutcome::Inserted => {
                    summary.accepted += 1;
                    self.spawn_sync(observation);
                }
                InsertOutcome::Duplicate => summary.duplicates += 1,
            }
        }

        summary
    }

    fn spawn_sync(&self, observation: Observation) {
        let Some(sync) = self.sync.clone() else {
            return;
        };

        match observation {
            Observation::Meal(meal) => {
                tokio::spawn(async move {
                    if let Err(e) = sync.sync_meal(&meal).await {
                        tracing::warn!(record_id = %meal.id, error = %e, "Failed to sync meal");
                    }
                });
            }
            Observation::Mood(entry) => {
                tokio::spawn(async move {
                    if let Err(e) = sync.sync_mood(&entry).await {
                        tracing::warn!(record_id = %entry.id, error = %e, "Failed to sync mood entry");
                    }
                });
            }
            Observation::Health(_) => {}
        }
    }
}
