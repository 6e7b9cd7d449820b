use acceleration_index::{AccelerationIndex, AccelerationResult};
use delta_zscore::{DeltaZScoreEngine, DeltaZScoreResult, LevelMetrics};
use health_scorer::HealthScoreResult;
use indicator_core::{HeadlineIndicator, ObservationSource, Series, SeriesId};
use serde::Serialize;
use signal_classifier::{SignalClassification, SignalClassifier};
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReport {
    pub series_id: SeriesId,
    pub name: Option<String>,
    pub delta: DeltaZScoreResult,
    pub level: Option<LevelMetrics>,
    pub classification: SignalClassification,
    pub acceleration: AccelerationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub health: HealthScoreResult,
    pub indicators: Vec<IndicatorReport>,
    /// Requested series that could not be fetched
    pub skipped: Vec<SeriesId>,
}

/// Delta z-score, level metrics, classification and FNAI of one series
pub fn indicator_report(series: &Series) -> IndicatorReport {
    let delta = DeltaZScoreEngine::new().calculate_or_neutral(series);
    let level = match LevelMetrics::from_series(series) {
        Ok(level) => Some(level),
        Err(e) => {
            debug!("No level metrics for {}: {}", series.series_id(), e);
            None
        }
    };
    let level_z = level.as_ref().map(|l| l.level_z_score).unwrap_or(0.0);

    // Catalog series are classified under their display name
    let name = HeadlineIndicator::from_series_id(series.series_id().as_str()).map(|i| i.name().to_string());
    let metric = name.as_deref().unwrap_or(series.series_id().as_str());

    let classification = SignalClassifier::new().classify(level_z, delta.delta_z_score, metric);
    let acceleration = AccelerationIndex::new().calculate(series);

    IndicatorReport {
        series_id: series.series_id().clone(),
        name,
        delta,
        level,
        classification,
        acceleration,
    }
}

/// Fetch every series concurrently and report on the ones that arrive, in
/// request order
pub async fn indicator_reports<S>(
    source: std::sync::Arc<S>,
    series_ids: &[SeriesId],
) -> (Vec<IndicatorReport>, Vec<SeriesId>)
where
    S: ObservationSource + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, series_id) in series_ids.iter().cloned().enumerate() {
        let source = source.clone();
        tasks.spawn(async move {
            let result = source.fetch_series(&series_id).await;
            (index, series_id, result)
        });
    }

    let mut fetched = Vec::with_capacity(series_ids.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(item) => fetched.push(item),
            Err(e) => warn!("Series fetch task failed: {}", e),
        }
    }
    fetched.sort_by_key(|(index, _, _)| *index);

    let mut reports = Vec::new();
    let mut skipped = Vec::new();
    for (_, series_id, result) in fetched {
        match result {
            Ok(series) => reports.push(indicator_report(&series)),
            Err(e) => {
                warn!("Skipping {}: {}", series_id, e);
                skipped.push(series_id);
            }
        }
    }
    (reports, skipped)
}
