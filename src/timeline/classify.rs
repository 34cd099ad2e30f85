//! Derived-metric classifiers
//!
//! Pure functions turning raw physiological measurements into labels.

use crate::timeline::types::SleepQuality;

/// First hour (inclusive) of the nocturnal resting window
pub const RESTING_WINDOW_START_HOUR: u32 = 1;
/// Last hour (inclusive) of the nocturnal resting window
pub const RESTING_WINDOW_END_HOUR: u32 = 4;

/// Classify a night's sleep by whole hours slept.
///
/// Minutes never move a session across a threshold.
pub fn sleep_quality(total_hours: u32) -> SleepQuality {
    match total_hours {
        h if h >= 7 => SleepQuality::Excellent,
        6 => SleepQuality::Good,
        5 => SleepQuality::Fair,
        _ => SleepQuality::Poor,
    }
}

/// Whether a heart-rate sample taken at `hour` (local wall clock) counts as resting
pub fn is_resting_heart_rate(hour: u32) -> bool {
    (RESTING_WINDOW_START_HOUR..=RESTING_WINDOW_END_HOUR).contains(&hour)
}
