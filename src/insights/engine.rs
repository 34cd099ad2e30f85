//! Insight Engine
//!
//! Applies threshold rules to correlator output and renders the patterns
//! it finds as sentences.
//!
//! Two rule families run over the full timeline:
//! - **mood after meal**: a meal followed by enough negative moods
//! - **sleep after meal**: a meal followed by a poor night's sleep
//!
//! A lighter query, [`InsightEngine::best_insight`], returns at most one
//! insight for a quick summary.

use crate::insights::window::{Correlator, Window};
use crate::timeline::{Event, EventId, EventKind, SleepQuality, TimelineStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rule thresholds and window sizes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InsightConfig {
    /// Moods up to this many hours after a meal are attributed to it
    #[serde(default = "default_mood_window_hours")]
    pub mood_window_hours: i64,

    /// Sleep starting up to this many hours after a meal is attributed to it
    #[serde(default = "default_sleep_window_hours")]
    pub sleep_window_hours: i64,

    /// Meals up to this many hours before sleep count as late meals
    #[serde(default = "default_pre_sleep_window_hours")]
    pub pre_sleep_window_hours: i64,

    /// Negative moods needed after one meal before it is reported
    #[serde(default = "default_min_negative_moods")]
    pub min_negative_moods: usize,

    /// Timeline size below which no insights are generated
    #[serde(default = "default_min_timeline_events")]
    pub min_timeline_events: usize,
}

fn default_mood_window_hours() -> i64 {
    4
}

fn default_sleep_window_hours() -> i64 {
    12
}

fn default_pre_sleep_window_hours() -> i64 {
    6
}

fn default_min_negative_moods() -> usize {
    2
}

fn default_min_timeline_events() -> usize {
    3
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            mood_window_hours: default_mood_window_hours(),
            sleep_window_hours: default_sleep_window_hours(),
            pre_sleep_window_hours: default_pre_sleep_window_hours(),
            min_negative_moods: default_min_negative_moods(),
            min_timeline_events: default_min_timeline_events(),
        }
    }
}

/// Longest accepted window, one year
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

impl InsightConfig {
    /// Check window sizes and thresholds
    pub fn validate(&self) -> Result<(), String> {
        for (name, hours) in [
            ("mood_window_hours", self.mood_window_hours),
            ("sleep_window_hours", self.sleep_window_hours),
            ("pre_sleep_window_hours", self.pre_sleep_window_hours),
        ] {
            if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
                return Err(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_WINDOW_HOURS, hours
                ));
            }
        }
        if self.min_negative_moods == 0 {
            return Err("min_negative_moods must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Which rule produced an insight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    MoodAfterMeal,
    SleepAfterMeal,
}

/// A generated insight
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Insight {
    pub pattern: Pattern,
    /// Meal the insight is about
    pub meal_id: EventId,
    /// Mood or sleep event that triggered it
    pub related_id: EventId,
    pub text: String,
}

/// Rule-based insight generator
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: InsightConfig,
}

impl InsightEngine {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Whether the timeline is large enough for insights
    pub fn has_enough_data(&self, events: &[Event]) -> bool {
        events.len() >= self.config.min_timeline_events
    }

    /// All insights for a timeline: mood patterns first, then sleep patterns.
    ///
    /// Returns an empty list when the timeline is below the size gate.
    pub fn generate(&self, events: &[Event]) -> Vec<Insight> {
        if !self.has_enough_data(events) {
            tracing::debug!(
                events = events.len(),
                required = self.config.min_timeline_events,
                "Not enough events for insights"
            );
            return Vec::new();
        }

        let correlator = Correlator::new(events);
        let mut insights = self.mood_patterns(&correlator);
        insights.extend(self.sleep_patterns(&correlator));

        tracing::debug!(
            events = events.len(),
            insights = insights.len(),
            "Generated insights"
        );
        insights
    }

    /// One insight per meal followed by enough negative moods, meals oldest first
    pub fn mood_patterns(&self, correlator: &Correlator<'_>) -> Vec<Insight> {
        let window = Window::forward_hours(self.config.mood_window_hours);

        correlator
            .correlate(EventKind::Meal, EventKind::Mood, window)
            .into_iter()
            .filter_map(|c| {
                let first = *self.negative_moods(c.matches)?.first()?;
                Some(Insight {
                    pattern: Pattern::MoodAfterMeal,
                    meal_id: c.anchor.id(),
                    related_id: first.id(),
                    text: format!(
                        "After eating {}, you often feel {}",
                        food_of(c.anchor).to_lowercase(),
                        mood_of(first).to_lowercase()
                    ),
                })
            })
            .collect()
    }

    /// One insight per meal whose first following sleep was poor, meals oldest first
    pub fn sleep_patterns(&self, correlator: &Correlator<'_>) -> Vec<Insight> {
        let window = Window::forward_hours(self.config.sleep_window_hours);

        correlator
            .correlate(EventKind::Meal, EventKind::Sleep, window)
            .into_iter()
            .filter_map(|c| {
                let sleep = c.matches.first()?;
                if !is_poor_sleep(sleep) {
                    return None;
                }
                Some(Insight {
                    pattern: Pattern::SleepAfterMeal,
                    meal_id: c.anchor.id(),
                    related_id: sleep.id(),
                    text: format!(
                        "Eating {} before bed may lead to poorer sleep",
                        food_of(c.anchor).to_lowercase()
                    ),
                })
            })
            .collect()
    }

    /// At most one insight, checked newest first.
    ///
    /// Meals with enough negative moods afterwards win, naming the most
    /// recent of those moods; otherwise the most recent poor sleep preceded
    /// by a meal.
    pub fn best_insight(&self, events: &[Event]) -> Option<Insight> {
        if !self.has_enough_data(events) {
            return None;
        }

        let correlator = Correlator::new(events);
        let mood_window = Window::forward_hours(self.config.mood_window_hours);

        for &meal in correlator.events(EventKind::Meal).iter().rev() {
            let moods = correlator.within(meal, EventKind::Mood, mood_window);
            if let Some(latest) = self.negative_moods(moods).and_then(|m| m.last().copied()) {
                return Some(Insight {
                    pattern: Pattern::MoodAfterMeal,
                    meal_id: meal.id(),
                    related_id: latest.id(),
                    text: format!(
                        "{} may cause {} feelings",
                        food_of(meal),
                        mood_of(latest).to_lowercase()
                    ),
                });
            }
        }

        let pre_sleep = Window::backward_hours(self.config.pre_sleep_window_hours);

        for &sleep in correlator.events(EventKind::Sleep).iter().rev() {
            if !is_poor_sleep(sleep) {
                continue;
            }
            // Nearest meal before bed
            if let Some(meal) = correlator.within(sleep, EventKind::Meal, pre_sleep).last() {
                return Some(Insight {
                    pattern: Pattern::SleepAfterMeal,
                    meal_id: meal.id(),
                    related_id: sleep.id(),
                    text: format!("Late {} may affect sleep quality", food_of(meal)),
                });
            }
        }

        None
    }

    /// Generate insights and write them onto their meal events.
    ///
    /// A meal matched by both rule families carries both sentences joined
    /// by "; ". Meals whose earlier insight no longer holds are cleared.
    /// Returns the number of meals annotated.
    pub fn annotate(&self, store: &mut TimelineStore) -> usize {
        let insights = self.generate(store.all());

        let mut order: Vec<EventId> = Vec::new();
        let mut texts: HashMap<EventId, Vec<String>> = HashMap::new();
        for insight in insights {
            let entry = texts.entry(insight.meal_id).or_insert_with(|| {
                order.push(insight.meal_id);
                Vec::new()
            });
            entry.push(insight.text);
        }

        let stale: Vec<EventId> = store
            .of_kind(EventKind::Meal)
            .filter(|e| e.insight().is_some() && !texts.contains_key(&e.id()))
            .map(|e| e.id())
            .collect();
        let cleared = stale
            .into_iter()
            .filter(|&id| store.clear_insight(id))
            .count();

        let mut annotated = 0;
        for id in order {
            if let Some(parts) = texts.remove(&id) {
                if store.annotate(id, parts.join("; ")) {
                    annotated += 1;
                }
            }
        }

        tracing::info!(annotated, cleared, "Annotated meals with insights");
        annotated
    }

    /// Negative moods in `moods` (oldest first), if there are enough of them.
    /// At least one is always required.
    fn negative_moods<'e>(&self, moods: &[&'e Event]) -> Option<Vec<&'e Event>> {
        let negative: Vec<&Event> = moods.iter().copied().filter(|m| m.is_negative_mood()).collect();
        let required = self.config.min_negative_moods.max(1);
        (negative.len() >= required).then_some(negative)
    }
}

fn food_of(meal: &Event) -> &str {
    meal.food_type().unwrap_or_else(|| meal.title())
}

fn mood_of(mood: &Event) -> &str {
    mood.mood().map(|m| m.label()).unwrap_or_else(|| mood.title())
}

fn is_poor_sleep(event: &Event) -> bool {
    event
        .sleep()
        .map(|s| s.quality == SleepQuality::Poor)
        .unwrap_or(false)
}
