//! Windowed Correlator
//!
//! Relates events of one kind to events of another kind that fall inside a
//! time window around them. Both window bounds are exclusive:
//!
//! ```text
//! Forward  Δ:  anchor.ts       < target.ts < anchor.ts + Δ
//! Backward Δ:  anchor.ts − Δ   < target.ts < anchor.ts
//! ```
//!
//! Targets are indexed per kind in ascending time order and the window
//! bounds are found by binary search, which gives the same result as a
//! linear scan over every target.

use crate::timeline::{Event, EventKind};
use chrono::Duration;
use std::collections::HashMap;

/// Which side of the anchor the window extends to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Events after the anchor
    Forward,
    /// Events before the anchor
    Backward,
}

/// Open time interval relative to an anchor event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub direction: Direction,
    /// Window length in milliseconds
    pub span_millis: i64,
}

impl Window {
    pub fn forward(span: Duration) -> Self {
        Self {
            direction: Direction::Forward,
            span_millis: span.num_milliseconds(),
        }
    }

    pub fn backward(span: Duration) -> Self {
        Self {
            direction: Direction::Backward,
            span_millis: span.num_milliseconds(),
        }
    }

    /// Forward window of `hours`; negative spans are empty, huge ones saturate
    pub fn forward_hours(hours: i64) -> Self {
        Self {
            direction: Direction::Forward,
            span_millis: hours_to_millis(hours),
        }
    }

    pub fn backward_hours(hours: i64) -> Self {
        Self {
            direction: Direction::Backward,
            span_millis: hours_to_millis(hours),
        }
    }

    /// Exclusive bounds `(low, high)` for an anchor timestamp
    pub fn bounds(&self, anchor: i64) -> (i64, i64) {
        match self.direction {
            Direction::Forward => (anchor, anchor.saturating_add(self.span_millis)),
            Direction::Backward => (anchor.saturating_sub(self.span_millis), anchor),
        }
    }

    /// Whether `timestamp` falls strictly inside the window around `anchor`
    pub fn contains(&self, anchor: i64, timestamp: i64) -> bool {
        let (low, high) = self.bounds(anchor);
        low < timestamp && timestamp < high
    }
}

fn hours_to_millis(hours: i64) -> i64 {
    match Duration::try_hours(hours.max(0)) {
        Some(span) => span.num_milliseconds(),
        None => i64::MAX,
    }
}

/// An anchor event and the targets found in its window
#[derive(Debug, Clone)]
pub struct Correlation<'a> {
    pub anchor: &'a Event,
    /// Matching targets, oldest first
    pub matches: &'a [&'a Event],
}

/// Per-kind time index over a timeline snapshot
pub struct Correlator<'a> {
    by_kind: HashMap<EventKind, Vec<&'a Event>>,
}

impl<'a> Correlator<'a> {
    /// Index events (in any order) by kind, ascending by timestamp
    pub fn new(events: &'a [Event]) -> Self {
        let mut by_kind: HashMap<EventKind, Vec<&'a Event>> = HashMap::new();
        for event in events {
            by_kind.entry(event.kind()).or_default().push(event);
        }
        for list in by_kind.values_mut() {
            list.sort_by_key(|e| e.timestamp());
        }
        Self { by_kind }
    }

    /// Events of one kind, oldest first
    pub fn events(&self, kind: EventKind) -> &[&'a Event] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Targets of `target` kind inside `window` around `anchor`, oldest first
    pub fn within(&self, anchor: &Event, target: EventKind, window: Window) -> &[&'a Event] {
        let targets = self.events(target);
        let (low, high) = window.bounds(anchor.timestamp());
        let start = targets.partition_point(|e| e.timestamp() <= low);
        let end = targets.partition_point(|e| e.timestamp() < high);
        if start >= end {
            return &[];
        }
        &targets[start..end]
    }

    /// For every event of `anchor` kind (oldest first), the `target` events in its window
    pub fn correlate(
        &self,
        anchor: EventKind,
        target: EventKind,
        window: Window,
    ) -> Vec<Correlation<'_>> {
        self.events(anchor)
            .iter()
            .map(|&a| Correlation {
                anchor: a,
                matches: self.within(a, target, window),
            })
            .collect()
    }
}
