//! Insights
//!
//! Rule-based correlation of meals with the moods and sleep that follow them.
//!
//! - **window**: Time windows and the per-kind correlator
//! - **engine**: Threshold rules and insight text

pub mod engine;
pub mod window;

pub use engine::{Insight, InsightConfig, InsightEngine, Pattern};
pub use window::{Correlation, Correlator, Direction, Window};
