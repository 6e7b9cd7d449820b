//! Delta Z-Score Module
//!
//! Converts raw indicator levels into z-scores of their period-over-period
//! percentage changes, so momentum can be compared across series that live on
//! very different scales. Also reports level statistics (12-month z-score,
//! YoY change, 3-month annualized rate) for the same series.

pub mod engine;
pub mod level;

pub use engine::{confidence_for, DeltaZScoreEngine, DeltaZScoreResult, MIN_DELTAS, MIN_OBSERVATIONS};
pub use level::{estimate_next_release, level_z_score, LevelMetrics};
