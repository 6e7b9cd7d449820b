use futures::future::join_all;
use indicator_core::{
    percentage_change, percentage_deltas, round_to, Confidence, Frequency, IndicatorError,
    ObservationSource, RollingWindow, Series, SeriesId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Minimum raw observations before a delta z-score is reported
pub const MIN_OBSERVATIONS: usize = 10;
/// Minimum valid deltas before a delta z-score is reported
pub const MIN_DELTAS: usize = 5;

const REPORT_DECIMALS: i32 = 4;

/// Z-score of the most recent period-over-period change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaZScoreResult {
    pub series_id: SeriesId,
    pub current_value: f64,
    pub prior_value: f64,
    /// Most recent percentage change
    pub current_delta: f64,
    pub delta_z_score: f64,
    pub rolling_mean: f64,
    pub rolling_std_dev: f64,
    pub confidence: Confidence,
    pub sample_size: usize,
}

impl DeltaZScoreResult {
    /// Degraded result for series that cannot support a z-score
    pub fn neutral(series_id: SeriesId, values: &[f64]) -> Self {
        let n = values.len();
        let current_value = values.last().copied().unwrap_or(0.0);
        let prior_value = if n >= 2 { values[n - 2] } else { current_value };

        Self {
            series_id,
            current_value: round_to(current_value, REPORT_DECIMALS),
            prior_value: round_to(prior_value, REPORT_DECIMALS),
            current_delta: 0.0,
            delta_z_score: 0.0,
            rolling_mean: 0.0,
            rolling_std_dev: 0.0,
            confidence: Confidence::Low,
            sample_size: n.saturating_sub(1),
        }
    }
}

/// Confidence band for a z-score given how much history produced it
pub fn confidence_for(sample_size: usize, std_dev: f64, z_score: f64) -> Confidence {
    let abs_z = z_score.abs();
    if sample_size >= 30 && std_dev < 10.0 && abs_z > 1.5 {
        Confidence::High
    } else if sample_size >= 15 && abs_z > 1.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub struct DeltaZScoreEngine {
    min_observations: usize,
    min_deltas: usize,
}

impl Default for DeltaZScoreEngine {
    fn default() -> Self {
        Self {
            min_observations: MIN_OBSERVATIONS,
            min_deltas: MIN_DELTAS,
        }
    }
}

impl DeltaZScoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculate(&self, series: &Series) -> Result<DeltaZScoreResult, IndicatorError> {
        self.calculate_values(series.series_id().clone(), &series.values(), series.frequency())
    }

    /// Delta z-score of a chronologically ordered value series
    pub fn calculate_values(
        &self,
        series_id: SeriesId,
        values: &[f64],
        frequency: Frequency,
    ) -> Result<DeltaZScoreResult, IndicatorError> {
        if values.len() < self.min_observations {
            return Err(IndicatorError::InsufficientData(format!(
                "{}: {} observations (need {})",
                series_id,
                values.len(),
                self.min_observations
            )));
        }

        let deltas = percentage_deltas(values);
        if deltas.len() < self.min_deltas {
            return Err(IndicatorError::InsufficientData(format!(
                "{}: {} valid deltas (need {})",
                series_id,
                deltas.len(),
                self.min_deltas
            )));
        }

        let window = RollingWindow::from_deltas(&deltas, frequency);

        let n = values.len();
        let current_value = values[n - 1];
        let prior_value = values[n - 2];
        let current_delta = percentage_change(prior_value, current_value).unwrap_or(0.0);

        let std_dev = window.std_dev();
        let delta_z_score = if std_dev == 0.0 {
            0.0
        } else {
            (current_delta - window.mean()) / std_dev
        };

        let reported_z = round_to(delta_z_score, REPORT_DECIMALS);
        let reported_std_dev = round_to(std_dev, REPORT_DECIMALS);
        // Graded on the reported figures so the band always matches them
        let confidence = confidence_for(window.sample_size(), reported_std_dev, reported_z);

        debug!(
            "{} delta z-score {:.4} (mean {:.4}, sd {:.4}, n {})",
            series_id,
            delta_z_score,
            window.mean(),
            std_dev,
            window.sample_size()
        );

        Ok(DeltaZScoreResult {
            series_id,
            current_value: round_to(current_value, REPORT_DECIMALS),
            prior_value: round_to(prior_value, REPORT_DECIMALS),
            current_delta: round_to(current_delta, REPORT_DECIMALS),
            delta_z_score: reported_z,
            rolling_mean: round_to(window.mean(), REPORT_DECIMALS),
            rolling_std_dev: reported_std_dev,
            confidence,
            sample_size: window.sample_size(),
        })
    }

    /// Like [`calculate`](Self::calculate) but degrades to a neutral, low-confidence result
    pub fn calculate_or_neutral(&self, series: &Series) -> DeltaZScoreResult {
        match self.calculate(series) {
            Ok(result) => result,
            Err(e) => {
                debug!("Neutral delta z-score for {}: {}", series.series_id(), e);
                DeltaZScoreResult::neutral(series.series_id().clone(), &series.values())
            }
        }
    }

    /// Fetch and score many series concurrently. Series that fail to fetch or lack
    /// history are left out of the result.
    pub async fn calculate_batch(
        &self,
        source: &dyn ObservationSource,
        series_ids: &[SeriesId],
    ) -> HashMap<SeriesId, DeltaZScoreResult> {
        let futures: Vec<_> = series_ids
            .iter()
            .map(|series_id| async move {
                let series = match source.fetch_series(series_id).await {
                    Ok(series) => series,
                    Err(e) => {
                        warn!("Skipping {} in delta z-score batch: {}", series_id, e);
                        return None;
                    }
                };

                match self.calculate(&series) {
                    Ok(result) => Some((series_id.clone(), result)),
                    Err(e) => {
                        debug!("Skipping {} in delta z-score batch: {}", series_id, e);
                        None
                    }
                }
            })
            .collect();

        join_all(futures).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};
    use indicator_core::MemorySource;

    fn monthly(series_id: &str, values: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let points: Vec<(NaiveDate, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + Months::new(i as u32), v))
            .collect();
        Series::from_points(series_id, Frequency::Monthly, &points).unwrap()
    }

    /// Compound a starting level by a sequence of percentage changes
    fn from_changes(start: f64, changes: &[f64]) -> Vec<f64> {
        let mut values = vec![start];
        for c in changes {
            let last = *values.last().unwrap();
            values.push(last * (1.0 + c / 100.0));
        }
        values
    }

    #[test]
    fn test_nine_observations_is_insufficient() {
        let engine = DeltaZScoreEngine::new();
        let series = monthly("PAYEMS", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        let result = engine.calculate(&series);
        assert!(matches!(result, Err(IndicatorError::InsufficientData(_))));
    }

    #[test]
    fn test_too_few_valid_deltas_is_insufficient() {
        let engine = DeltaZScoreEngine::new();
        // Ten observations, but zero bases leave only four usable deltas
        let series = monthly("T10Y2Y", &[0.0, 0.5, 0.0, 0.2, 0.0, 0.1, 0.0, 0.3, 0.0, 0.4]);

        let result = engine.calculate(&series);
        assert!(matches!(result, Err(IndicatorError::InsufficientData(_))));
    }

    #[test]
    fn test_hand_computed_z_score() {
        let engine = DeltaZScoreEngine::new();
        let changes = [10.0, -10.0, 10.0, -10.0, 10.0, -10.0, 10.0, -10.0, 10.0, 20.0];
        let series = monthly("INDPRO", &from_changes(100.0, &changes));

        let result = engine.calculate(&series).unwrap();

        // mean = 3, sample variance = 1210 / 9
        assert_eq!(result.sample_size, 10);
        assert!((result.rolling_mean - 3.0).abs() < 1e-3);
        assert!((result.rolling_std_dev - 11.595).abs() < 1e-3);
        assert!((result.current_delta - 20.0).abs() < 1e-3);
        assert!((result.delta_z_score - 1.4661).abs() < 1e-3);
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_zero_std_dev_gives_zero_z_score() {
        let engine = DeltaZScoreEngine::new();
        let series = monthly("FLAT", &[5.0; 20]);

        let result = engine.calculate(&series).unwrap();
        assert_eq!(result.rolling_std_dev, 0.0);
        assert_eq!(result.delta_z_score, 0.0);
        assert!(result.delta_z_score.is_finite());
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn test_high_confidence_spike() {
        let engine = DeltaZScoreEngine::new();
        let mut changes: Vec<f64> = (0..39).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }).collect();
        changes.push(6.0);
        let series = monthly("RSAFS", &from_changes(500.0, &changes));

        let result = engine.calculate(&series).unwrap();
        assert_eq!(result.sample_size, 40);
        assert!(result.rolling_std_dev < 10.0);
        assert!(result.delta_z_score > 1.5);
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_window_is_frequency_sized() {
        let engine = DeltaZScoreEngine::new();
        let values = from_changes(100.0, &vec![0.5; 80]);
        let result = engine
            .calculate_values(SeriesId::from("GDPC1"), &values, Frequency::Quarterly)
            .unwrap();

        assert_eq!(result.sample_size, 40);
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(confidence_for(30, 9.9, 1.6), Confidence::High);
        assert_eq!(confidence_for(30, 10.0, 1.6), Confidence::Medium);
        assert_eq!(confidence_for(29, 1.0, -2.0), Confidence::Medium);
        assert_eq!(confidence_for(15, 1.0, 1.01), Confidence::Medium);
        assert_eq!(confidence_for(15, 1.0, 1.0), Confidence::Low);
        assert_eq!(confidence_for(14, 1.0, 3.0), Confidence::Low);
    }

    #[test]
    fn test_confidence_matches_reported_values() {
        let engine = DeltaZScoreEngine::new();
        for step in 0..60 {
            let spike = 2.0 + step as f64 * 0.05;
            let mut changes: Vec<f64> = (0..39).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }).collect();
            changes.push(spike);
            let series = monthly("RSAFS", &from_changes(500.0, &changes));

            let result = engine.calculate(&series).unwrap();
            let expected = confidence_for(result.sample_size, result.rolling_std_dev, result.delta_z_score);
            assert_eq!(result.confidence, expected, "spike {}", spike);
        }
    }

    #[test]
    fn test_neutral_fallback() {
        let engine = DeltaZScoreEngine::new();
        let series = monthly("UMCSENT", &[70.0, 72.0, 71.0]);

        let result = engine.calculate_or_neutral(&series);
        assert_eq!(result.delta_z_score, 0.0);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.current_value, 71.0);
        assert_eq!(result.prior_value, 72.0);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let mut source = MemorySource::new();
        source.insert_series(monthly("GOOD", &from_changes(100.0, &[1.0; 24])));
        source.insert_series(monthly("SHORT", &[1.0, 2.0, 3.0]));
        source.insert_series(monthly("DOWN", &from_changes(100.0, &[1.0; 24])));
        source.mark_unavailable("DOWN");

        let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let quarterly: Vec<(NaiveDate, f64)> = from_changes(100.0, &vec![0.5; 50])
            .into_iter()
            .enumerate()
            .map(|(i, v)| (start + Months::new(3 * i as u32), v))
            .collect();
        source.insert_series(Series::from_points("GDPC1", Frequency::Quarterly, &quarterly).unwrap());

        let engine = DeltaZScoreEngine::new();
        let ids: Vec<SeriesId> = ["GOOD", "SHORT", "GDPC1", "DOWN", "MISSING"]
            .iter()
            .map(|&s| SeriesId::from(s))
            .collect();

        let results = engine.calculate_batch(&source, &ids).await;

        assert_eq!(results.len(), 2);
        // Each series is windowed by its own frequency
        assert_eq!(results[&SeriesId::from("GOOD")].sample_size, 24);
        assert_eq!(results[&SeriesId::from("GDPC1")].sample_size, 40);
    }
}
