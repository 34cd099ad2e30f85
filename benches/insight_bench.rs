//! Benchmarks for the timeline store and insight engine
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mealmood::insights::{Correlator, InsightEngine, Window};
use mealmood::producers::{Meal, MoodEntry};
use mealmood::timeline::{Event, EventFactory, EventKind, MoodSource, MoodState, TimelineStore};

const HOUR: i64 = 3_600_000;
const T0: i64 = 1_747_648_800_000;

const FOODS: [&str; 5] = ["Pizza", "Salad", "Curry", "Ramen", "Oats"];

/// One simulated day: three meals, four moods and a night of sleep
fn create_test_events(days: usize) -> Vec<Event> {
    let factory = EventFactory::utc();
    let mut events = Vec::with_capacity(days * 8);

    for day in 0..days as i64 {
        let base = T0 + day * 24 * HOUR;

        for (slot, hour) in [8, 13, 19].into_iter().enumerate() {
            let food = FOODS[(day as usize + slot) % FOODS.len()];
            let meal = Meal::new(Some(food.to_string()), "", base + hour * HOUR);
            events.push(factory.meal(&meal).unwrap());
        }

        for (i, hour) in [9, 14, 16, 21].into_iter().enumerate() {
            let mood = MoodState::all()[(day as usize + i) % 7];
            let entry = MoodEntry::new(mood, 60, base + hour * HOUR, MoodSource::Manual);
            events.push(factory.mood(&entry).unwrap());
        }

        let sleep_hours = 4 + day % 5;
        events.push(
            factory
                .sleep(base + 23 * HOUR, base + (23 + sleep_hours) * HOUR)
                .unwrap(),
        );
    }

    events
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for days in [30, 365] {
        let events = create_test_events(days);
        group.throughput(Throughput::Elements(events.len() as u64));

        group.bench_function(format!("insert_{}_days", days), |b| {
            b.iter(|| TimelineStore::from_events(black_box(events.clone())))
        });
    }

    group.finish();
}

fn bench_correlator(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlator");

    for days in [30, 365] {
        let store = TimelineStore::from_events(create_test_events(days));
        group.throughput(Throughput::Elements(store.len() as u64));

        group.bench_function(format!("meal_mood_{}_days", days), |b| {
            b.iter(|| {
                let correlator = Correlator::new(black_box(store.all()));
                correlator
                    .correlate(EventKind::Meal, EventKind::Mood, Window::forward_hours(4))
                    .len()
            })
        });
    }

    group.finish();
}

fn bench_insights(c: &mut Criterion) {
    let mut group = c.benchmark_group("insights");
    let engine = InsightEngine::default();

    for days in [30, 365] {
        let store = TimelineStore::from_events(create_test_events(days));
        group.throughput(Throughput::Elements(store.len() as u64));

        group.bench_function(format!("generate_{}_days", days), |b| {
            b.iter(|| engine.generate(black_box(store.all())))
        });

        group.bench_function(format!("best_{}_days", days), |b| {
            b.iter(|| engine.best_insight(black_box(store.all())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store, bench_correlator, bench_insights);
criterion_main!(benches);
