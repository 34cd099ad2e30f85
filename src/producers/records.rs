//! Producer records
//!
//! The finalized observations handed over by producers (meal capture, mood
//! check-in, health-store fetches). Meals and mood entries are also the unit
//! of remote sync.

use crate::timeline::{MoodSource, MoodState};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Food type used when the image classifier produced no label
pub const UNKNOWN_FOOD: &str = "Unknown";

fn unknown_food() -> String {
    UNKNOWN_FOOD.to_string()
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A saved meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Label from the image classifier
    #[serde(default = "unknown_food")]
    pub food_type: String,
    /// Free-text description typed by the user
    #[serde(default)]
    pub description: String,
    /// Unix timestamp in milliseconds
    #[serde(default = "now_millis")]
    pub timestamp: i64,
}

impl Meal {
    /// Build a meal from a classifier label; a missing or blank label becomes "Unknown"
    pub fn new(label: Option<String>, description: impl Into<String>, timestamp: i64) -> Self {
        let food_type = label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(unknown_food);

        Self {
            id: Uuid::new_v4(),
            food_type,
            description: description.into(),
            timestamp,
        }
    }
}

/// A saved mood check-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(alias = "moodState")]
    pub mood: MoodState,
    /// Percentage, 0..=100
    pub intensity: u8,
    #[serde(default = "now_millis")]
    pub timestamp: i64,
    #[serde(default)]
    pub source: MoodSource,
}

impl MoodEntry {
    pub fn new(mood: MoodState, intensity: u8, timestamp: i64, source: MoodSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            mood,
            intensity,
            timestamp,
            source,
        }
    }
}

/// Type of a raw health-store sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthMetric {
    /// Sleep analysis interval (value unused)
    Sleep,
    /// Heart rate in beats per minute
    HeartRate,
    /// Heart-rate variability (SDNN) in milliseconds
    Hrv,
}

impl std::fmt::Display for HealthMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthMetric::Sleep => write!(f, "sleep"),
            HealthMetric::HeartRate => write!(f, "heart_rate"),
            HealthMetric::Hrv => write!(f, "hrv"),
        }
    }
}

/// A raw sample from the health data source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthSample {
    pub metric: HealthMetric,
    /// Sample start, Unix milliseconds
    pub start: i64,
    /// Sample end, Unix milliseconds; point samples may omit it
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub value: f64,
}

impl HealthSample {
    pub fn sleep(start: i64, end: i64) -> Self {
        Self {
            metric: HealthMetric::Sleep,
            start,
            end: Some(end),
            value: 0.0,
        }
    }

    pub fn heart_rate(timestamp: i64, bpm: f64) -> Self {
        Self {
            metric: HealthMetric::HeartRate,
            start: timestamp,
            end: None,
            value: bpm,
        }
    }

    pub fn hrv(timestamp: i64, millis: f64) -> Self {
        Self {
            metric: HealthMetric::Hrv,
            start: timestamp,
            end: None,
            value: millis,
        }
    }
}

/// Any finalized observation a producer can hand to the journal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Meal(Meal),
    Mood(MoodEntry),
    Health(HealthSample),
}

impl From<Meal> for Observation {
    fn from(meal: Meal) -> Self {
        Observation::Meal(meal)
    }
}

impl From<MoodEntry> for Observation {
    fn from(entry: MoodEntry) -> Self {
        Observation::Mood(entry)
    }
}

impl From<HealthSample> for Observation {
    fn from(sample: HealthSample) -> Self {
        Observation::Health(sample)
    }
}
