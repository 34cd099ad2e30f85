//! Timeline Handle
//!
//! Shared, cloneable access to one [`TimelineStore`]. All writes take the
//! write lock, so producers running on different tasks are funneled into a
//! single writer. Every successful mutation publishes the new store version
//! on a watch channel for subscribers (API, dashboards, CLI polling).

use crate::timeline::store::{InsertOutcome, TimelineStore};
use crate::timeline::types::{Event, EventId, EventKind};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Cloneable handle to the process-wide timeline
#[derive(Clone)]
pub struct TimelineHandle {
    store: Arc<RwLock<TimelineStore>>,
    version_tx: Arc<watch::Sender<u64>>,
}

impl Default for TimelineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineHandle {
    /// Create a handle around an empty store
    pub fn new() -> Self {
        Self::with_store(TimelineStore::new())
    }

    /// Create a handle around an existing store
    pub fn with_store(store: TimelineStore) -> Self {
        let (version_tx, _) = watch::channel(store.version());
        Self {
            store: Arc::new(RwLock::new(store)),
            version_tx: Arc::new(version_tx),
        }
    }

    /// Insert one event
    pub async fn insert(&self, event: Event) -> InsertOutcome {
        let mut store = self.store.write().await;
        let outcome = store.insert(event);
        if outcome.is_inserted() {
            self.version_tx.send_replace(store.version());
        }
        outcome
    }

    /// Insert many events under a single lock acquisition
    pub async fn insert_all(&self, events: impl IntoIterator<Item = Event>) -> Vec<InsertOutcome> {
        let mut store = self.store.write().await;
        let outcomes: Vec<InsertOutcome> = events.into_iter().map(|e| store.insert(e)).collect();
        if outcomes.iter().any(InsertOutcome::is_inserted) {
            self.version_tx.send_replace(store.version());
        }
        outcomes
    }

    /// Attach insight text to an event
    pub async fn annotate(&self, id: EventId, insight: impl Into<String>) -> bool {
        let mut store = self.store.write().await;
        let found = store.annotate(id, insight);
        if found {
            self.version_tx.send_replace(store.version());
        }
        found
    }

    /// Run a read-only query against a consistent view of the store
    pub async fn read<R>(&self, f: impl FnOnce(&TimelineStore) -> R) -> R {
        let store = self.store.read().await;
        f(&store)
    }

    /// Run a mutation under the write lock, publishing the version afterwards
    pub async fn write<R>(&self, f: impl FnOnce(&mut TimelineStore) -> R) -> R {
        let mut store = self.store.write().await;
        let before = store.version();
        let result = f(&mut store);
        if store.version() != before {
            self.version_tx.send_replace(store.version());
        }
        result
    }

    /// Copy of all events, newest first
    pub async fn snapshot(&self) -> Vec<Event> {
        self.read(|store| store.all().to_vec()).await
    }

    pub async fn len(&self) -> usize {
        self.read(|store| store.len()).await
    }

    pub async fn is_empty(&self) -> bool {
        self.read(|store| store.is_empty()).await
    }

    pub async fn last_of_kind(&self, kind: EventKind) -> Option<Event> {
        self.read(|store| store.last_of_kind(kind).cloned()).await
    }

    /// Latest published version
    pub fn version(&self) -> u64 {
        *self.version_tx.borrow()
    }

    /// Subscribe to version changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::Meal;
    use crate::timeline::factory::EventFactory;

    const HOUR: i64 = 3_600_000;
    const T0: i64 = 1_747_648_800_000;

    fn meal(ts: i64) -> Event {
        EventFactory::utc()
            .meal(&Meal::new(Some("Rice".to_string()), "", ts))
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_publishes_version() {
        let handle = TimelineHandle::new();
        let mut rx = handle.subscribe();
        assert_eq!(*rx.borrow(), 0);

        handle.insert(meal(T0)).await;

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(handle.version(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_does_not_publish() {
        let handle = TimelineHandle::new();
        let factory = EventFactory::utc();
        handle.insert(factory.sleep(T0, T0 + 7 * HOUR).unwrap()).await;
        let rx = handle.subscribe();

        let outcome = handle.insert(factory.sleep(T0, T0 + 7 * HOUR).unwrap()).await;

        assert_eq!(outcome, InsertOutcome::Duplicate);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(handle.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_producers_are_serialized() {
        let handle = TimelineHandle::new();

        let mut tasks = Vec::new();
        for i in 0..20 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.insert(meal(T0 + (i % 7) * HOUR)).await
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.len(), 20);
        for pair in snapshot.windows(2) {
            assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
        assert_eq!(handle.version(), 20);
    }

    #[tokio::test]
    async fn test_insert_all() {
        let handle = TimelineHandle::new();
        let outcomes = handle.insert_all(vec![meal(T0), meal(T0 + HOUR)]).await;

        assert_eq!(outcomes, vec![InsertOutcome::Inserted, InsertOutcome::Inserted]);
        assert_eq!(handle.last_of_kind(EventKind::Meal).await.unwrap().timestamp(), T0 + HOUR);
    }
}
