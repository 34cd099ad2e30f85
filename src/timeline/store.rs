//! Timeline Store
//!
//! Append-only collection of events kept in descending timestamp order
//! (newest first). A sleep or heart-metric event is dropped as a
//! re-ingestion when any stored event shares its timestamp; meals and moods
//! are always inserted.
//!
//! The store itself does no locking. Concurrent producers go through
//! [`TimelineHandle`](crate::timeline::TimelineHandle).

use crate::timeline::types::{Event, EventId, EventKind};
use serde::Serialize;

/// Result of an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    /// Event was added to the timeline
    Inserted,
    /// A sleep/heart event landed on an occupied timestamp; nothing changed
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// In-memory, time-ordered event collection
#[derive(Debug, Default)]
pub struct TimelineStore {
    /// Events sorted by timestamp, newest first
    events: Vec<Event>,
    /// Incremented on every successful mutation
    version: u64,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from events in any order
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut store = Self::new();
        for event in events {
            store.insert(event);
        }
        store
    }

    /// Insert an event, keeping newest-first order
    pub fn insert(&mut self, event: Event) -> InsertOutcome {
        if event.kind().is_deduplicated() && self.contains_duplicate(&event) {
            tracing::debug!(
                event_id = %event.id(),
                kind = %event.kind(),
                timestamp = event.timestamp(),
                "Skipping re-ingested event"
            );
            return InsertOutcome::Duplicate;
        }

        // First position whose timestamp is older than the new event
        let ts = event.timestamp();
        let pos = self.events.partition_point(|e| e.timestamp() >= ts);

        tracing::trace!(
            event_id = %event.id(),
            kind = %event.kind(),
            timestamp = ts,
            position = pos,
            "Inserting event"
        );

        self.events.insert(pos, event);
        self.version += 1;
        InsertOutcome::Inserted
    }

    /// All events, newest first
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Change counter; bumps on every successful insert or annotation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id() == id)
    }

    /// Events of one kind, newest first
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    /// Most recent event of the given kind
    pub fn last_of_kind(&self, kind: EventKind) -> Option<&Event> {
        self.of_kind(kind).next()
    }

    /// Attach insight text to an event. Returns false if the id is unknown.
    pub fn annotate(&mut self, id: EventId, insight: impl Into<String>) -> bool {
        match self.events.iter_mut().find(|e| e.id() == id) {
            Some(event) => {
                event.set_insight(insight.into());
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Remove insight text from an event. Returns false if the id is
    /// unknown or the event had no insight.
    pub fn clear_insight(&mut self, id: EventId) -> bool {
        let cleared = self
            .events
            .iter_mut()
            .find(|e| e.id() == id)
            .and_then(Event::take_insight)
            .is_some();
        if cleared {
            self.version += 1;
        }
        cleared
    }

    fn contains_duplicate(&self, event: &Event) -> bool {
        let ts = event.timestamp();
        let start = self.events.partition_point(|e| e.timestamp() > ts);
        self.events[start..]
            .iter()
            .take_while(|e| e.timestamp() == ts)
            .any(|e| e.is_duplicate_of(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::{Meal, MoodEntry};
    use crate::timeline::factory::EventFactory;
    use crate::timeline::types::{MoodSource, MoodState};

    const HOUR: i64 = 3_600_000;
    const T0: i64 = 1_747_648_800_000;

    fn meal(food: &str, ts: i64) -> Event {
        EventFactory::utc()
            .meal(&Meal::new(Some(food.to_string()), "", ts))
            .unwrap()
    }

    fn mood(state: MoodState, ts: i64) -> Event {
        EventFactory::utc()
            .mood(&MoodEntry::new(state, 50, ts, MoodSource::Manual))
            .unwrap()
    }

    fn sleep(start: i64, hours: i64) -> Event {
        EventFactory::utc().sleep(start, start + hours * HOUR).unwrap()
    }

    fn assert_descending(store: &TimelineStore) {
        for pair in store.all().windows(2) {
            assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
    }

    #[test]
    fn test_insert_keeps_descending_order() {
        let mut store = TimelineStore::new();
        for offset in [3, 1, 5, 0, 4, 2, 2] {
            store.insert(meal("Salad", T0 + offset * HOUR));
            assert_descending(&store);
        }
        assert_eq!(store.len(), 7);
        assert_eq!(store.all()[0].timestamp(), T0 + 5 * HOUR);
        assert_eq!(store.all()[6].timestamp(), T0);
    }

    #[test]
    fn test_mixed_kinds_ordered() {
        let store = TimelineStore::from_events(vec![
            mood(MoodState::Sad, T0 + HOUR),
            sleep(T0 + 9 * HOUR, 4),
            meal("Pizza", T0),
        ]);

        let kinds: Vec<EventKind> = store.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::Sleep, EventKind::Mood, EventKind::Meal]);
    }

    #[test]
    fn test_sleep_reingest_is_noop() {
        let mut store = TimelineStore::new();
        assert_eq!(store.insert(sleep(T0, 7)), InsertOutcome::Inserted);
        let version = store.version();

        assert_eq!(store.insert(sleep(T0, 7)), InsertOutcome::Duplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_heart_metric_reingest_is_noop() {
        let factory = EventFactory::utc();
        let mut store = TimelineStore::new();

        store.insert(factory.heart_rate(T0, 64.0).unwrap());
        let outcome = store.insert(factory.heart_rate(T0, 64.0).unwrap());

        assert_eq!(outcome, InsertOutcome::Duplicate);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_hrv_blocked_by_heart_rate_at_same_time() {
        let factory = EventFactory::utc();
        let mut store = TimelineStore::new();

        store.insert(factory.heart_rate(T0, 64.0).unwrap());
        let outcome = store.insert(factory.hrv(T0, 40.0).unwrap());

        assert_eq!(outcome, InsertOutcome::Duplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].subtitle(), "64 bpm");
    }

    #[test]
    fn test_meals_with_same_timestamp_not_deduplicated() {
        let mut store = TimelineStore::new();
        store.insert(meal("Pizza", T0));
        store.insert(meal("Pizza", T0));

        assert_eq!(store.len(), 2);
        assert_ne!(store.all()[0].id(), store.all()[1].id());
    }

    #[test]
    fn test_moods_with_same_timestamp_not_deduplicated() {
        let mut store = TimelineStore::new();
        store.insert(mood(MoodState::Happy, T0));
        store.insert(mood(MoodState::Happy, T0));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sleep_blocked_by_meal_at_same_time() {
        let mut store = TimelineStore::new();
        store.insert(meal("Toast", T0));
        let version = store.version();

        assert_eq!(store.insert(sleep(T0, 6)), InsertOutcome::Duplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_meal_not_blocked_by_sleep_at_same_time() {
        let mut store = TimelineStore::new();
        store.insert(sleep(T0, 6));
        assert_eq!(store.insert(meal("Toast", T0)), InsertOutcome::Inserted);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_last_of_kind() {
        let store = TimelineStore::from_events(vec![
            meal("Pizza", T0),
            meal("Sushi", T0 + 2 * HOUR),
            mood(MoodState::Tired, T0 + 3 * HOUR),
        ]);

        assert_eq!(store.last_of_kind(EventKind::Meal).unwrap().title(), "Sushi");
        assert_eq!(store.last_of_kind(EventKind::Mood).unwrap().title(), "Tired");
        assert!(store.last_of_kind(EventKind::Sleep).is_none());
    }

    #[test]
    fn test_annotate() {
        let mut store = TimelineStore::new();
        let event = meal("Pizza", T0);
        let id = event.id();
        store.insert(event);
        let version = store.version();

        assert!(store.annotate(id, "After eating pizza, you often feel sad"));
        assert_eq!(
            store.get(id).unwrap().insight(),
            Some("After eating pizza, you often feel sad")
        );
        assert_eq!(store.version(), version + 1);

        assert!(!store.annotate(uuid::Uuid::new_v4(), "nothing"));

        let version = store.version();
        assert!(store.clear_insight(id));
        assert!(store.get(id).unwrap().insight().is_none());
        assert_eq!(store.version(), version + 1);
        assert!(!store.clear_insight(id));
        assert_eq!(store.version(), version + 1);
    }

    #[test]
    fn test_version_counts_inserts() {
        let mut store = TimelineStore::new();
        assert_eq!(store.version(), 0);
        store.insert(meal("Pizza", T0));
        store.insert(mood(MoodState::Sad, T0 + HOUR));
        assert_eq!(store.version(), 2);
    }
}
