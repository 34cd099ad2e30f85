//! Core data types for the timeline
//!
//! This module defines the fundamental types shared by the store, the
//! correlator and the insight engine:
//! - `Event`: A single point-in-time observation
//! - `EventKind` and `EventPayload`: What was observed
//! - `MoodState`, `MoodSource`, `SleepQuality`: Classification enums

use crate::timeline::error::{TimelineError, TimelineResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique event identifier
pub type EventId = Uuid;

/// Kind of observation an event represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A logged meal
    Meal,
    /// A mood self-report or detected mood
    Mood,
    /// A sleep summary
    Sleep,
    /// Heart rate or heart-rate variability
    HeartMetric,
}

impl EventKind {
    /// Get all kinds for iteration
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Meal,
            EventKind::Mood,
            EventKind::Sleep,
            EventKind::HeartMetric,
        ]
    }

    /// Whether re-ingesting an event of this kind at the same timestamp is skipped
    pub fn is_deduplicated(&self) -> bool {
        matches!(self, EventKind::Sleep | EventKind::HeartMetric)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Meal => write!(f, "meal"),
            EventKind::Mood => write!(f, "mood"),
            EventKind::Sleep => write!(f, "sleep"),
            EventKind::HeartMetric => write!(f, "heart_metric"),
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meal" => Ok(EventKind::Meal),
            "mood" => Ok(EventKind::Mood),
            "sleep" => Ok(EventKind::Sleep),
            "heart_metric" | "health" => Ok(EventKind::HeartMetric),
            other => Err(TimelineError::UnknownKind(other.to_string())),
        }
    }
}

/// Mood state reported by the user or detected from a face
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MoodState {
    Happy,
    Sad,
    Angry,
    Surprised,
    /// Fallback when the detector has nothing better
    #[default]
    Neutral,
    Anxious,
    Tired,
    #[serde(rename = "No Results", alias = "NoResult")]
    NoResult,
}

impl MoodState {
    /// Get all mood states for iteration
    pub fn all() -> &'static [MoodState] {
        &[
            MoodState::Happy,
            MoodState::Sad,
            MoodState::Angry,
            MoodState::Surprised,
            MoodState::Neutral,
            MoodState::Anxious,
            MoodState::Tired,
            MoodState::NoResult,
        ]
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            MoodState::Happy => "Happy",
            MoodState::Sad => "Sad",
            MoodState::Angry => "Angry",
            MoodState::Surprised => "Surprised",
            MoodState::Neutral => "Neutral",
            MoodState::Anxious => "Anxious",
            MoodState::Tired => "Tired",
            MoodState::NoResult => "No Results",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoodState::Happy => "😊",
            MoodState::Sad => "😢",
            MoodState::Angry => "😠",
            MoodState::Surprised => "😲",
            MoodState::Neutral => "😐",
            MoodState::Anxious => "😰",
            MoodState::Tired => "😴",
            MoodState::NoResult => "",
        }
    }

    /// Negative moods count towards meal/mood patterns
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            MoodState::Sad | MoodState::Angry | MoodState::Anxious | MoodState::Tired
        )
    }

    /// Look up a mood by its display label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.label().eq_ignore_ascii_case(label))
            .or_else(|| label.eq_ignore_ascii_case("noresult").then_some(MoodState::NoResult))
    }
}

impl std::fmt::Display for MoodState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a mood entry came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MoodSource {
    /// Detected by the face-mood classifier
    Automatic,
    /// Picked by the user
    #[default]
    Manual,
}

/// Sleep quality derived from total sleep duration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepQuality::Excellent => write!(f, "excellent"),
            SleepQuality::Good => write!(f, "good"),
            SleepQuality::Fair => write!(f, "fair"),
            SleepQuality::Poor => write!(f, "poor"),
        }
    }
}

/// Summarized sleep session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SleepData {
    pub hours: u32,
    pub minutes: u32,
    pub quality: SleepQuality,
}

impl SleepData {
    /// Total duration in seconds
    pub fn duration_secs(&self) -> u64 {
        self.hours as u64 * 3600 + self.minutes as u64 * 60
    }
}

/// A single heart-rate reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HeartRateData {
    /// Beats per minute
    pub value: f64,
    /// Sampled inside the nocturnal resting window
    pub is_resting: bool,
}

impl HeartRateData {
    /// Rounded beats per minute
    pub fn bpm(&self) -> i64 {
        self.value.round() as i64
    }
}

/// Kind-specific event data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Meal {
        food_type: String,
        description: String,
    },
    Mood {
        state: MoodState,
        intensity: u8,
        source: MoodSource,
    },
    Sleep(SleepData),
    HeartRate(HeartRateData),
    Hrv {
        /// SDNN in milliseconds
        millis: f64,
    },
}

impl EventPayload {
    /// The event kind this payload belongs to
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Meal { .. } => EventKind::Meal,
            EventPayload::Mood { .. } => EventKind::Mood,
            EventPayload::Sleep(_) => EventKind::Sleep,
            EventPayload::HeartRate(_) | EventPayload::Hrv { .. } => EventKind::HeartMetric,
        }
    }


    fn validate(&self) -> TimelineResult<()> {
        match self {
            EventPayload::Mood { intensity, .. } if *intensity > 100 => {
                Err(TimelineError::InvalidIntensity(*intensity as i64))
            }
            EventPayload::HeartRate(hr) if !hr.value.is_finite() || hr.value < 0.0 => Err(
                TimelineError::InvalidSample(format!("heart rate must be a non-negative number, got {}", hr.value)),
            ),
            EventPayload::Hrv { millis } if !millis.is_finite() || *millis < 0.0 => Err(
                TimelineError::InvalidSample(format!("HRV must be a non-negative number, got {}", millis)),
            ),
            _ => Ok(()),
        }
    }
}

/// A single timestamped observation on the timeline
///
/// Everything except `insight` is fixed at construction; fields are only
/// reachable through accessors.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Event {
    id: EventId,
    kind: EventKind,
    /// Unix timestamp in milliseconds
    timestamp: i64,
    title: String,
    subtitle: String,
    payload: EventPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    insight: Option<String>,
}

impl Event {
    /// Create a new event with a fresh id
    ///
    /// Fails if the payload does not belong to `kind` or carries out-of-range values.
    pub fn new(
        kind: EventKind,
        timestamp: i64,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        payload: EventPayload,
    ) -> TimelineResult<Self> {
        if payload.kind() != kind {
            return Err(TimelineError::PayloadMismatch {
                kind,
                payload: payload.kind(),
            });
        }
        if chrono::DateTime::from_timestamp_millis(timestamp).is_none() {
            return Err(TimelineError::InvalidTimestamp(timestamp));
        }
        payload.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            timestamp,
            title: title.into(),
            subtitle: subtitle.into(),
            payload,
            insight: None,
        })
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    /// Food type, for meal events
    pub fn food_type(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Meal { food_type, .. } => Some(food_type),
            _ => None,
        }
    }

    /// Mood state, for mood events
    pub fn mood(&self) -> Option<MoodState> {
        match &self.payload {
            EventPayload::Mood { state, .. } => Some(*state),
            _ => None,
        }
    }

    /// Sleep summary, for sleep events
    pub fn sleep(&self) -> Option<&SleepData> {
        match &self.payload {
            EventPayload::Sleep(data) => Some(data),
            _ => None,
        }
    }

    /// Whether this event is a mood event with a negative mood
    pub fn is_negative_mood(&self) -> bool {
        self.mood().map(|m| m.is_negative()).unwrap_or(false)
    }

    /// Whether inserting this event next to the stored `other` counts as a
    /// re-ingestion.
    ///
    /// Only sleep and heart metrics are checked, and any stored event at the
    /// same instant blocks them, whatever its kind.
    pub fn is_duplicate_of(&self, other: &Event) -> bool {
        self.kind.is_deduplicated() && self.timestamp == other.timestamp
    }

    pub(crate) fn set_insight(&mut self, insight: String) {
        self.insight = Some(insight);
    }

    pub(crate) fn take_insight(&mut self) -> Option<String> {
        self.insight.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_payload() -> EventPayload {
        EventPayload::Meal {
            food_type: "Pizza".to_string(),
            description: "margherita".to_string(),
        }
    }

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventKind::Meal, 1_000, "Pizza", "margherita", meal_payload()).unwrap();

        assert_eq!(event.kind(), EventKind::Meal);
        assert_eq!(event.timestamp(), 1_000);
        assert_eq!(event.food_type(), Some("Pizza"));
        assert!(event.insight().is_none());
    }

    #[test]
    fn test_payload_mismatch_rejected() {
        let err = Event::new(EventKind::Mood, 1_000, "Pizza", "", meal_payload()).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::PayloadMismatch {
                kind: EventKind::Mood,
                payload: EventKind::Meal
            }
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mood = EventPayload::Mood {
            state: MoodState::Sad,
            intensity: 150,
            source: MoodSource::Manual,
        };
        assert!(Event::new(EventKind::Mood, 0, "Sad", "", mood).is_err());

        let hr = EventPayload::HeartRate(HeartRateData {
            value: f64::NAN,
            is_resting: false,
        });
        assert!(Event::new(EventKind::HeartMetric, 0, "Heart Rate", "", hr).is_err());

        let hrv = EventPayload::Hrv { millis: -1.0 };
        assert!(Event::new(EventKind::HeartMetric, 0, "HRV", "", hrv).is_err());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::new(EventKind::Meal, 0, "Pizza", "", meal_payload()).unwrap();
        let b = Event::new(EventKind::Meal, 0, "Pizza", "", meal_payload()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_negative_moods() {
        let negative: Vec<MoodState> = MoodState::all()
            .iter()
            .copied()
            .filter(|m| m.is_negative())
            .collect();
        assert_eq!(
            negative,
            vec![MoodState::Sad, MoodState::Angry, MoodState::Anxious, MoodState::Tired]
        );
    }

    #[test]
    fn test_mood_labels() {
        assert_eq!(MoodState::NoResult.label(), "No Results");
        assert_eq!(MoodState::from_label("angry"), Some(MoodState::Angry));
        assert_eq!(MoodState::from_label("No Results"), Some(MoodState::NoResult));
        assert_eq!(MoodState::from_label("hungry"), None);
    }

    #[test]
    fn test_mood_serialization() {
        let json = serde_json::to_string(&MoodState::NoResult).unwrap();
        assert_eq!(json, "\"No Results\"");
        let restored: MoodState = serde_json::from_str("\"Tired\"").unwrap();
        assert_eq!(restored, MoodState::Tired);
    }

    #[test]
    fn test_duplicate_is_any_event_at_same_instant() {
        let hr = Event::new(
            EventKind::HeartMetric,
            5_000,
            "Heart Rate",
            "72 bpm",
            EventPayload::HeartRate(HeartRateData {
                value: 72.0,
                is_resting: false,
            }),
        )
        .unwrap();
        let hrv = Event::new(
            EventKind::HeartMetric,
            5_000,
            "HRV",
            "42.0 ms",
            EventPayload::Hrv { millis: 42.0 },
        )
        .unwrap();
        let meal = Event::new(
            EventKind::Meal,
            5_000,
            "Toast",
            "",
            EventPayload::Meal {
                food_type: "Toast".to_string(),
                description: String::new(),
            },
        )
        .unwrap();

        assert!(hrv.is_duplicate_of(&hr));
        assert!(hr.is_duplicate_of(&meal));
        assert!(!meal.is_duplicate_of(&hr));
    }

    #[test]
    fn test_event_kind_parse() {
        assert_eq!("meal".parse::<EventKind>().unwrap(), EventKind::Meal);
        assert_eq!("heart_metric".parse::<EventKind>().unwrap(), EventKind::HeartMetric);
        assert!("snack".parse::<EventKind>().is_err());
    }
}
