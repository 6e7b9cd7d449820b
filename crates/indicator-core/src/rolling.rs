//! Rolling-window statistics over period-over-period changes.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::Frequency;

/// Mean and sample standard deviation of a slice of deltas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStatistics {
    pub mean: f64,
    pub std_dev: f64,
}

impl RollingStatistics {
    /// Sample (n-1) standard deviation; zero when fewer than two values.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std_dev: 0.0 };
        }

        let mean = values.mean();
        let std_dev = if values.len() < 2 { 0.0 } else { values.std_dev() };

        Self {
            mean: if mean.is_finite() { mean } else { 0.0 },
            std_dev: if std_dev.is_finite() { std_dev } else { 0.0 },
        }
    }
}

/// Read-only view of the most recent deltas for a frequency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingWindow {
    deltas: Vec<f64>,
    stats: RollingStatistics,
}

impl RollingWindow {
    /// Keeps the last `frequency.delta_window()` deltas, or all of them if fewer exist.
    pub fn from_deltas(deltas: &[f64], frequency: Frequency) -> Self {
        let start = deltas.len().saturating_sub(frequency.delta_window());
        let window = deltas[start..].to_vec();
        let stats = RollingStatistics::compute(&window);
        Self { deltas: window, stats }
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.stats.std_dev
    }

    pub fn sample_size(&self) -> usize {
        self.deltas.len()
    }

    pub fn stats(&self) -> RollingStatistics {
        self.stats
    }
}

/// Percentage change of one value relative to the one before it.
/// `None` when the base is zero or the result is not finite.
pub fn percentage_change(prior: f64, current: f64) -> Option<f64> {
    if prior == 0.0 {
        return None;
    }
    let change = (current - prior) / prior.abs() * 100.0;
    change.is_finite().then_some(change)
}

/// Period-over-period percentage deltas, skipping zero bases and non-finite results
pub fn percentage_deltas(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| percentage_change(w[0], w[1]))
        .collect()
}

/// Raw period-over-period differences
pub fn raw_changes(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
