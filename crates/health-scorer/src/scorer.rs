use chrono::{NaiveDate, Utc};
use economic_regime_detector::{RegimeAssessment, RegimeDetector};
use indicator_core::{HeadlineIndicator, HeadlineSource, ObservationSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    composite_confidence, confidence_range, score_component, Component, ComponentScore, ScoreCache,
    WeightStructure,
};

const MAX_DRIVERS: usize = 3;
const MAX_RISK_FACTORS: usize = 3;

/// Component thresholds below which a risk factor is reported, in report order
const RISK_THRESHOLDS: [(Component, f64, &str); 4] = [
    (Component::FinancialStress, 40.0, "elevated financial stress"),
    (Component::InflationTrajectory, 35.0, "inflation trajectory concerning"),
    (Component::LaborHealth, 40.0, "labor market weakness"),
    (Component::EconomicExpectations, 40.0, "sentiment below norms"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreResult {
    pub score: f64,
    pub confidence: f64,
    pub range: [f64; 2],
    pub key_drivers: Vec<String>,
    pub risk_factors: Vec<String>,
    pub regime: RegimeAssessment,
    pub components: Vec<ComponentScore>,
    pub weights: WeightStructure,
    pub as_of: NaiveDate,
}

impl HealthScoreResult {
    pub fn component(&self, component: Component) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.component == component)
    }
}

/// Weighted sum of component scores, rounded and clamped to `[0,100]`
pub fn weighted_score(components: &[ComponentScore], weights: &WeightStructure) -> f64 {
    let total: f64 = components
        .iter()
        .map(|c| c.score * weights.get(c.component))
        .sum();
    total.round().clamp(0.0, 100.0)
}

/// Top components by absolute weighted distance from neutral
pub fn key_drivers(components: &[ComponentScore], weights: &WeightStructure) -> Vec<String> {
    let mut impacts: Vec<(Component, f64)> = components
        .iter()
        .map(|c| (c.component, (c.score - 50.0) * weights.get(c.component)))
        .collect();
    impacts.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    impacts
        .into_iter()
        .take(MAX_DRIVERS)
        .map(|(component, impact)| format!("{}: {:+.1} points", component.name(), impact))
        .collect()
}

pub fn risk_factors(components: &[ComponentScore]) -> Vec<String> {
    RISK_THRESHOLDS
        .iter()
        .filter(|(component, threshold, _)| {
            components
                .iter()
                .any(|c| c.component == *component && c.score < *threshold)
        })
        .take(MAX_RISK_FACTORS)
        .map(|(_, _, label)| label.to_string())
        .collect()
}

/// Distinct indicators the components ask for, counting auxiliary reads once
fn expected_indicators() -> usize {
    let mut seen: Vec<HeadlineIndicator> = Component::ALL
        .iter()
        .flat_map(|c| c.inputs().iter().map(|(i, _)| *i))
        .collect();
    seen.push(HeadlineIndicator::PceInflation);
    seen.sort_by_key(|i| i.series_id());
    seen.dedup();
    seen.len()
}

pub struct CompositeHealthScorer {
    headlines: Arc<dyn HeadlineSource>,
    observations: Arc<dyn ObservationSource>,
    regime_detector: RegimeDetector,
    cache: Option<ScoreCache>,
}

impl CompositeHealthScorer {
    pub fn new(headlines: Arc<dyn HeadlineSource>, observations: Arc<dyn ObservationSource>) -> Self {
        Self {
            headlines,
            observations,
            regime_detector: RegimeDetector::new(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ScoreCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&ScoreCache> {
        self.cache.as_ref()
    }

    pub async fn score_now(&self) -> HealthScoreResult {
        self.score(Utc::now().date_naive()).await
    }

    /// Composite health as of `as_of`. Never fails: unavailable components
    /// score a neutral 50 and an undetectable regime reads as expansion.
    pub async fn score(&self, as_of: NaiveDate) -> HealthScoreResult {
        let cache_key = ScoreCache::key_for(as_of);
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&cache_key)) {
            debug!("Health score cache hit for {}", cache_key);
            return cached;
        }

        let source = self.headlines.as_ref();
        let (growth, stress, labor, inflation, policy, expectations, regime) = tokio::join!(
            score_component(Component::GrowthMomentum, source),
            score_component(Component::FinancialStress, source),
            score_component(Component::LaborHealth, source),
            score_component(Component::InflationTrajectory, source),
            score_component(Component::PolicyEffectiveness, source),
            score_component(Component::EconomicExpectations, source),
            self.regime_detector.detect(source, self.observations.as_ref()),
        );

        let components: Vec<ComponentScore> = Component::ALL
            .into_iter()
            .zip([growth, stress, labor, inflation, policy, expectations])
            .map(|(component, result)| match result {
                Ok(score) => score,
                Err(e) => {
                    warn!("{} unavailable, using neutral score: {}", component.name(), e);
                    ComponentScore::neutral(component)
                }
            })
            .collect();

        let result = self.assemble(components, regime, as_of);

        info!(
            "Health score {} (confidence {}, regime {}) as of {}",
            result.score,
            result.confidence,
            result.regime.regime.name(),
            as_of
        );

        if let Some(cache) = &self.cache {
            cache.set(cache_key, result.clone());
        }
        result
    }

    fn assemble(
        &self,
        components: Vec<ComponentScore>,
        regime: RegimeAssessment,
        as_of: NaiveDate,
    ) -> HealthScoreResult {
        let weights = WeightStructure::for_regime(regime.regime);
        let score = weighted_score(&components, &weights);

        // Latest period date per indicator; PCE is read by two components
        let mut latest: HashMap<HeadlineIndicator, NaiveDate> = HashMap::new();
        for reading in components.iter().flat_map(|c| c.readings.iter()) {
            latest
                .entry(reading.indicator)
                .and_modify(|d| *d = (*d).max(reading.period_date))
                .or_insert(reading.period_date);
        }
        let mut reading_dates: Vec<NaiveDate> = latest.into_values().collect();
        reading_dates.sort();

        let component_scores: Vec<f64> = components.iter().map(|c| c.score).collect();
        let confidence =
            composite_confidence(&reading_dates, expected_indicators(), &component_scores, as_of).round();

        HealthScoreResult {
            score,
            confidence,
            range: confidence_range(score, confidence),
            key_drivers: key_drivers(&components, &weights),
            risk_factors: risk_factors(&components),
            regime,
            components,
            weights,
            as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Months;
    use economic_regime_detector::Regime;
    use indicator_core::{Frequency, HeadlineReading, MemorySource, Series};
    use HeadlineIndicator::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn flat_monthly(series_id: &str, value: f64) -> Series {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let points: Vec<(NaiveDate, f64)> = (0..24)
            .map(|i| (start + Months::new(i), value))
            .collect();
        Series::from_points(series_id, Frequency::Monthly, &points).unwrap()
    }

    fn source_with(values: &[(HeadlineIndicator, f64)]) -> MemorySource {
        let mut source = MemorySource::new();
        for (indicator, value) in values {
            source.insert_headline(HeadlineReading {
                indicator: *indicator,
                value: *value,
                period_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            });
        }
        source.insert_series(flat_monthly("UNRATE", 3.9));
        source.insert_series(flat_monthly("EMRATIO", 60.5));
        source
    }

    fn healthy() -> MemorySource {
        source_with(&[
            (GdpGrowth, 3.0),
            (IndustrialProduction, 1.0),
            (RetailSales, 3.0),
            (LeadingIndex, 0.5),
            (FinancialStressIndex, -0.6),
            (HighYieldSpread, 3.2),
            (Vix, 14.0),
            (YieldCurveSpread, 0.8),
            (UnemploymentRate, 3.9),
            (NonfarmPayrolls, 210.0),
            (InitialClaims, 215.0),
            (EmploymentPopulationRatio, 60.5),
            (CpiInflation, 2.3),
            (CoreCpiInflation, 2.6),
            (PceInflation, 2.2),
            (PpiInflation, 1.8),
            (FederalFundsRate, 3.5),
            (TenYearYield, 4.0),
            (ConsumerSentiment, 85.0),
            (ConsumerConfidence, 100.5),
            (BuildingPermits, 1450.0),
            (HousingStarts, 1400.0),
        ])
    }

    fn distressed() -> MemorySource {
        source_with(&[
            (GdpGrowth, 1.0),
            (FinancialStressIndex, 2.5),
            (HighYieldSpread, 8.0),
            (Vix, 35.0),
            (YieldCurveSpread, -0.8),
            (UnemploymentRate, 7.5),
            (NonfarmPayrolls, -50.0),
            (InitialClaims, 400.0),
            (EmploymentPopulationRatio, 57.0),
            (CpiInflation, 6.5),
            (CoreCpiInflation, 6.0),
            (PceInflation, 6.2),
            (PpiInflation, 7.0),
            (FederalFundsRate, 5.0),
            (ConsumerSentiment, 55.0),
            (ConsumerConfidence, 96.0),
            (BuildingPermits, 1100.0),
            (HousingStarts, 1000.0),
        ])
    }

    fn scorer(source: MemorySource) -> CompositeHealthScorer {
        let source = Arc::new(source);
        CompositeHealthScorer::new(source.clone(), source)
    }

    fn assert_bounds(result: &HealthScoreResult) {
        assert!((0.0..=100.0).contains(&result.score));
        assert!(result.range[0] <= result.score && result.score <= result.range[1]);
        assert!(result.range[0] >= 0.0 && result.range[1] <= 100.0);
        assert!((30.0..=95.0).contains(&result.confidence));
        assert!(result.key_drivers.len() <= 3);
        assert!(result.risk_factors.len() <= 3);
        assert!((result.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_healthy_economy() {
        let result = scorer(healthy()).score(as_of()).await;
        assert_bounds(&result);

        let growth = result.component(Component::GrowthMomentum).unwrap();
        assert!((growth.score - 66.0).abs() < 1e-9);
        let stress = result.component(Component::FinancialStress).unwrap();
        assert!((stress.score - 79.75).abs() < 1e-9);

        assert_eq!(result.regime.regime, Regime::Expansion);
        assert!(!result.regime.degraded);
        assert_eq!(result.score, 77.0);
        assert_eq!(result.confidence, 90.0);
        assert_eq!(result.range, [76.0, 78.0]);
        assert_eq!(
            result.key_drivers,
            vec![
                "Financial Stress: +7.4 points",
                "Labor Health: +6.4 points",
                "Inflation Trajectory: +5.4 points",
            ]
        );
        assert!(result.risk_factors.is_empty());
    }

    #[tokio::test]
    async fn test_risk_factors_are_capped() {
        let result = scorer(distressed()).score(as_of()).await;
        assert_bounds(&result);

        // All four thresholds trip; only the first three are reported
        assert!(result.component(Component::EconomicExpectations).unwrap().score < 40.0);
        assert_eq!(
            result.risk_factors,
            vec![
                "elevated financial stress",
                "inflation trajectory concerning",
                "labor market weakness",
            ]
        );
        assert!(result.key_drivers.iter().all(|d| d.contains(": -")));
    }

    #[tokio::test]
    async fn test_unavailable_component_is_neutral() {
        let mut source = healthy();
        for indicator in [FinancialStressIndex, HighYieldSpread, Vix, YieldCurveSpread] {
            source.mark_unavailable(indicator.series_id());
        }

        let result = scorer(source).score(as_of()).await;
        assert_bounds(&result);

        let stress = result.component(Component::FinancialStress).unwrap();
        assert_eq!(stress.score, 50.0);
        assert!(stress.degraded);
        assert!(result.confidence < 90.0);
    }

    #[tokio::test]
    async fn test_empty_source_is_neutral() {
        let result = scorer(MemorySource::new()).score(as_of()).await;
        assert_bounds(&result);

        assert_eq!(result.score, 50.0);
        assert_eq!(result.confidence, 30.0);
        assert!(result.regime.degraded);
        assert_eq!(result.regime.regime, Regime::Expansion);
        assert!(result.risk_factors.is_empty());
    }

    #[tokio::test]
    async fn test_scoring_is_idempotent() {
        let scorer = scorer(distressed());
        let first = scorer.score(as_of()).await;
        let second = scorer.score(as_of()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cache_hit_and_clear() {
        let scorer = scorer(healthy()).with_cache(ScoreCache::new(300));
        let result = scorer.score(as_of()).await;

        let cache = scorer.cache().unwrap();
        let key = ScoreCache::key_for(as_of());
        assert_eq!(key, "health:2024-06-30");
        assert_eq!(cache.get(&key), Some(result.clone()));
        assert_eq!(scorer.score(as_of()).await, result);

        cache.clear();
        assert_eq!(cache.get(&key), None);
        assert_eq!(scorer.score(as_of()).await, result);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let first = scorer(healthy()).score(as_of()).await;

        let cache = ScoreCache::new(0);
        cache.set(ScoreCache::key_for(as_of()), first);
        assert_eq!(cache.get(&ScoreCache::key_for(as_of())), None);
    }

    #[test]
    fn test_key_drivers_order() {
        let weights = WeightStructure::default();
        let mut components: Vec<ComponentScore> =
            Component::ALL.iter().map(|c| ComponentScore::neutral(*c)).collect();
        components[0].score = 40.0; // growth -3.0
        components[3].score = 90.0; // inflation +6.0
        components[5].score = 0.0; // expectations, weighted out

        let drivers = key_drivers(&components, &weights);
        assert_eq!(drivers[0], "Inflation Trajectory: +6.0 points");
        assert_eq!(drivers[1], "Growth Momentum: -3.0 points");
        assert_eq!(drivers.len(), 3);
    }

    #[test]
    fn test_weighted_score_rounds_and_clamps() {
        let weights = WeightStructure::default();
        let components: Vec<ComponentScore> = Component::ALL
            .iter()
            .map(|c| ComponentScore {
                score: 64.6,
                ..ComponentScore::neutral(*c)
            })
            .collect();
        assert_eq!(weighted_score(&components, &weights), 65.0);
    }

    #[test]
    fn test_expected_indicators() {
        assert_eq!(expected_indicators(), HeadlineIndicator::ALL.len());
    }
}
