//! Producers
//!
//! Everything that feeds the timeline:
//! - Producer records (meals, mood entries, health samples)
//! - Collaborator traits (image classifier, mood detector, health source, record sync)
//! - The [`Journal`] that turns records into timeline events
//! - CSV import of historical observations

mod csv_import;
mod journal;
mod records;

pub use csv_import::{CsvImportResult, CsvImporter, ImportError};
pub use journal::{IngestSummary, Journal, RejectedObservation};
pub use records::{HealthMetric, HealthSample, Meal, MoodEntry, Observation, UNKNOWN_FOOD};

use crate::sync::SyncError;
use crate::timeline::MoodState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Output of an image classifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    /// Top label, if the model produced one
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

/// Labels a meal photo with a food type
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Classification;
}

/// Guesses the user's current mood (e.g. from a selfie)
#[async_trait]
pub trait MoodDetector: Send + Sync {
    /// Detected mood; implementations fall back to [`MoodState::Neutral`]
    async fn detect(&self) -> MoodState;
}

/// Source of raw health samples
#[async_trait]
pub trait HealthSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<HealthSample>, ProducerError>;
}

/// Remote persistence for meals and mood entries
#[async_trait]
pub trait RecordSync: Send + Sync {
    async fn sync_meal(&self, meal: &Meal) -> Result<(), SyncError>;

    async fn sync_mood(&self, entry: &MoodEntry) -> Result<(), SyncError>;
}

/// Errors raised by producer collaborators
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error("Health source unavailable: {0}")]
    Unavailable(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
