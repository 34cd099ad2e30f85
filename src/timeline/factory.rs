//! Event Factory
//!
//! Wraps producer records into timeline events. Every display string the
//! timeline carries (titles, subtitles) is decided here.

use crate::producers::{HealthMetric, HealthSample, Meal, MoodEntry, Observation, UNKNOWN_FOOD};
use crate::timeline::classify::{is_resting_heart_rate, sleep_quality};
use crate::timeline::error::{TimelineError, TimelineResult};
use crate::timeline::types::{Event, EventKind, EventPayload, HeartRateData, SleepData};
use chrono::{DateTime, FixedOffset, Local, Offset, Timelike, Utc};

/// Builds events from producer records
///
/// Holds the UTC offset used to read the local hour of heart-rate samples.
#[derive(Debug, Clone, Copy)]
pub struct EventFactory {
    offset: FixedOffset,
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::local()
    }
}

impl EventFactory {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Factory using the host's current UTC offset
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    /// Factory reading wall-clock hours in UTC
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Factory with an explicit offset in minutes east of UTC
    pub fn with_offset_minutes(minutes: i32) -> TimelineResult<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| TimelineError::InvalidSample(format!("UTC offset out of range: {} minutes", minutes)))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local wall-clock hour of a timestamp
    pub fn local_hour(&self, timestamp: i64) -> TimelineResult<u32> {
        DateTime::from_timestamp_millis(timestamp)
            .map(|dt| dt.with_timezone(&self.offset).hour())
            .ok_or(TimelineError::InvalidTimestamp(timestamp))
    }

    /// Build the event for any observation
    pub fn observation(&self, observation: &Observation) -> TimelineResult<Event> {
        match observation {
            Observation::Meal(meal) => self.meal(meal),
            Observation::Mood(entry) => self.mood(entry),
            Observation::Health(sample) => self.health_sample(sample),
        }
    }

    /// Meal event: title is the food type, subtitle the description
    pub fn meal(&self, meal: &Meal) -> TimelineResult<Event> {
        let food_type = match meal.food_type.trim() {
            "" => UNKNOWN_FOOD.to_string(),
            label => label.to_string(),
        };

        Event::new(
            EventKind::Meal,
            meal.timestamp,
            food_type.clone(),
            meal.description.clone(),
            EventPayload::Meal {
                food_type,
                description: meal.description.clone(),
            },
        )
    }

    /// Mood event: title is the mood label, subtitle "{emoji} {intensity}%"
    pub fn mood(&self, entry: &MoodEntry) -> TimelineResult<Event> {
        Event::new(
            EventKind::Mood,
            entry.timestamp,
            entry.mood.label(),
            format!("{} {}%", entry.mood.emoji(), entry.intensity),
            EventPayload::Mood {
                state: entry.mood,
                intensity: entry.intensity,
                source: entry.source,
            },
        )
    }

    /// Build the event for a raw health sample
    pub fn health_sample(&self, sample: &HealthSample) -> TimelineResult<Event> {
        match sample.metric {
            HealthMetric::Sleep => {
                let end = sample.end.ok_or_else(|| {
                    TimelineError::InvalidSample("sleep sample has no end time".to_string())
                })?;
                self.sleep(sample.start, end)
            }
            HealthMetric::HeartRate => self.heart_rate(sample.start, sample.value),
            HealthMetric::Hrv => self.hrv(sample.start, sample.value),
        }
    }

    /// Sleep event at the session start, with quality from whole hours slept
    pub fn sleep(&self, start: i64, end: i64) -> TimelineResult<Event> {
        if end < start {
            return Err(TimelineError::InvalidSample(format!(
                "sleep ends before it starts ({} < {})",
                end, start
            )));
        }

        let total_secs = end.checked_sub(start).ok_or_else(|| {
            TimelineError::InvalidSample(format!("sleep span out of range: {}..{}", start, end))
        })? / 1000;
        let hours = u32::try_from(total_secs / 3600).map_err(|_| {
            TimelineError::InvalidSample(format!("sleep duration too long: {}s", total_secs))
        })?;
        let minutes = ((total_secs % 3600) / 60) as u32;

        let data = SleepData {
            hours,
            minutes,
            quality: sleep_quality(hours),
        };

        Event::new(
            EventKind::Sleep,
            start,
            "Sleep",
            format!("{}h {}m", hours, minutes),
            EventPayload::Sleep(data),
        )
    }

    /// Heart-rate event; titled "Resting HR" inside the nocturnal window
    pub fn heart_rate(&self, timestamp: i64, bpm: f64) -> TimelineResult<Event> {
        let is_resting = is_resting_heart_rate(self.local_hour(timestamp)?);
        let data = HeartRateData {
            value: bpm,
            is_resting,
        };

        Event::new(
            EventKind::HeartMetric,
            timestamp,
            if is_resting { "Resting HR" } else { "Heart Rate" },
            format!("{} bpm", bpm.round() as i64),
            EventPayload::HeartRate(data),
        )
    }

    /// HRV event with a one-decimal millisecond subtitle
    pub fn hrv(&self, timestamp: i64, millis: f64) -> TimelineResult<Event> {
        Event::new(
            EventKind::HeartMetric,
            timestamp,
            "HRV",
            format!("{:.1} ms", millis),
            EventPayload::Hrv { millis },
        )
    }
}
