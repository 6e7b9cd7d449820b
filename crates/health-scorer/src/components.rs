//! The six health components and their indicator bucket scoring

use chrono::NaiveDate;
use futures::future::join_all;
use indicator_core::{FetchError, HeadlineIndicator, HeadlineReading, HeadlineSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Neutral prior for a component or indicator without data
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Assumed inflation when PCE is unavailable for the real policy rate
const INFLATION_TARGET: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    GrowthMomentum,
    FinancialStress,
    LaborHealth,
    InflationTrajectory,
    PolicyEffectiveness,
    EconomicExpectations,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::GrowthMomentum,
        Component::FinancialStress,
        Component::LaborHealth,
        Component::InflationTrajectory,
        Component::PolicyEffectiveness,
        Component::EconomicExpectations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::GrowthMomentum => "Growth Momentum",
            Component::FinancialStress => "Financial Stress",
            Component::LaborHealth => "Labor Health",
            Component::InflationTrajectory => "Inflation Trajectory",
            Component::PolicyEffectiveness => "Policy Effectiveness",
            Component::EconomicExpectations => "Economic Expectations",
        }
    }

    /// Indicators feeding this component with their relative weights
    pub fn inputs(&self) -> &'static [(HeadlineIndicator, f64)] {
        use HeadlineIndicator::*;
        match self {
            Component::GrowthMomentum => &[
                (GdpGrowth, 0.40),
                (IndustrialProduction, 0.20),
                (RetailSales, 0.20),
                (LeadingIndex, 0.20),
            ],
            Component::FinancialStress => &[
                (FinancialStressIndex, 0.35),
                (HighYieldSpread, 0.25),
                (Vix, 0.25),
                (YieldCurveSpread, 0.15),
            ],
            Component::LaborHealth => &[
                (UnemploymentRate, 0.35),
                (NonfarmPayrolls, 0.30),
                (InitialClaims, 0.20),
                (EmploymentPopulationRatio, 0.15),
            ],
            Component::InflationTrajectory => &[
                (CpiInflation, 0.30),
                (CoreCpiInflation, 0.25),
                (PceInflation, 0.30),
                (PpiInflation, 0.15),
            ],
            Component::PolicyEffectiveness => &[(FederalFundsRate, 0.60), (TenYearYield, 0.40)],
            Component::EconomicExpectations => &[
                (ConsumerSentiment, 0.30),
                (ConsumerConfidence, 0.30),
                (BuildingPermits, 0.20),
                (HousingStarts, 0.20),
            ],
        }
    }
}

/// First bucket whose upper bound exceeds `value`, else `otherwise`
fn bucket(value: f64, buckets: &[(f64, f64)], otherwise: f64) -> f64 {
    buckets
        .iter()
        .find(|(upper, _)| value < *upper)
        .map(|(_, score)| *score)
        .unwrap_or(otherwise)
}

fn inflation_score(yoy: f64) -> f64 {
    let distance = (yoy - INFLATION_TARGET).abs();
    bucket(distance, &[(0.5, 90.0), (1.0, 75.0), (2.0, 55.0), (3.0, 35.0)], 15.0)
}

/// Health score in `[0,100]` of one headline reading, in catalog units.
/// For the federal funds rate `value` is the real rate.
pub fn indicator_score(indicator: HeadlineIndicator, value: f64) -> f64 {
    if !value.is_finite() {
        return NEUTRAL_SCORE;
    }

    let score = match indicator {
        HeadlineIndicator::GdpGrowth => bucket(
            value,
            &[(0.0, 15.0), (1.5, 35.0), (2.5, 55.0), (3.5, 75.0), (5.0, 90.0)],
            80.0,
        ),
        HeadlineIndicator::IndustrialProduction => {
            bucket(value, &[(-2.0, 20.0), (0.0, 40.0), (2.0, 60.0), (4.0, 80.0)], 70.0)
        }
        HeadlineIndicator::RetailSales => {
            bucket(value, &[(0.0, 20.0), (2.0, 40.0), (4.0, 60.0), (6.0, 80.0)], 70.0)
        }
        HeadlineIndicator::LeadingIndex => bucket(value, &[(-1.0, 20.0), (0.0, 40.0), (1.0, 60.0)], 80.0),

        HeadlineIndicator::FinancialStressIndex => {
            bucket(value, &[(-0.5, 85.0), (0.0, 70.0), (1.0, 50.0), (2.0, 30.0)], 15.0)
        }
        HeadlineIndicator::HighYieldSpread => {
            bucket(value, &[(3.0, 85.0), (4.0, 70.0), (5.0, 55.0), (7.0, 35.0)], 15.0)
        }
        HeadlineIndicator::Vix => bucket(value, &[(15.0, 85.0), (20.0, 70.0), (25.0, 55.0), (30.0, 35.0)], 15.0),
        // Inversion is the stress signal
        HeadlineIndicator::YieldCurveSpread => {
            bucket(value, &[(-0.5, 20.0), (0.0, 35.0), (0.5, 55.0), (1.5, 75.0)], 85.0)
        }

        HeadlineIndicator::UnemploymentRate => {
            bucket(value, &[(4.0, 85.0), (4.5, 70.0), (5.5, 55.0), (7.0, 35.0)], 15.0)
        }
        HeadlineIndicator::NonfarmPayrolls => {
            bucket(value, &[(0.0, 15.0), (100.0, 40.0), (200.0, 65.0), (300.0, 85.0)], 80.0)
        }
        HeadlineIndicator::InitialClaims => bucket(value, &[(225.0, 85.0), (275.0, 65.0), (350.0, 45.0)], 20.0),
        HeadlineIndicator::EmploymentPopulationRatio => {
            bucket(value, &[(58.0, 30.0), (60.0, 50.0), (61.0, 65.0)], 80.0)
        }

        HeadlineIndicator::CpiInflation
        | HeadlineIndicator::CoreCpiInflation
        | HeadlineIndicator::PceInflation
        | HeadlineIndicator::PpiInflation => inflation_score(value),

        // Mildly restrictive real rates score best
        HeadlineIndicator::FederalFundsRate => {
            bucket(value, &[(-1.0, 35.0), (0.0, 55.0), (1.5, 80.0), (2.5, 60.0)], 35.0)
        }
        HeadlineIndicator::TenYearYield => bucket(value, &[(2.0, 50.0), (3.0, 70.0), (4.5, 80.0), (5.5, 55.0)], 30.0),

        HeadlineIndicator::ConsumerSentiment => {
            bucket(value, &[(60.0, 25.0), (70.0, 45.0), (80.0, 65.0), (90.0, 80.0)], 90.0)
        }
        HeadlineIndicator::ConsumerConfidence => {
            bucket(value, &[(97.0, 25.0), (99.0, 45.0), (100.0, 60.0), (101.0, 75.0)], 85.0)
        }
        HeadlineIndicator::BuildingPermits => bucket(value, &[(1200.0, 30.0), (1400.0, 55.0), (1600.0, 75.0)], 85.0),
        HeadlineIndicator::HousingStarts => bucket(value, &[(1100.0, 30.0), (1300.0, 55.0), (1500.0, 75.0)], 85.0),
    };

    score.clamp(0.0, 100.0)
}

/// One reading's share of a component score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorContribution {
    pub indicator: HeadlineIndicator,
    pub value: f64,
    pub period_date: NaiveDate,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub component: Component,
    pub score: f64,
    pub contributions: Vec<IndicatorContribution>,
    /// Readings fetched for this component, including auxiliary ones
    #[serde(skip)]
    pub readings: Vec<HeadlineReading>,
    /// True when the neutral prior stands in for a failed component
    pub degraded: bool,
}

impl ComponentScore {
    pub fn neutral(component: Component) -> Self {
        Self {
            component,
            score: NEUTRAL_SCORE,
            contributions: Vec::new(),
            readings: Vec::new(),
            degraded: true,
        }
    }
}

/// Score one component from whichever of its indicators can be fetched.
/// Fails only when none of them can.
pub async fn score_component(
    component: Component,
    source: &dyn HeadlineSource,
) -> Result<ComponentScore, FetchError> {
    let inputs = component.inputs();
    let fetches = inputs.iter().map(|(indicator, _)| source.latest(*indicator));
    let results = join_all(fetches).await;

    // Real policy rate needs the latest PCE inflation
    let pce = match component {
        Component::PolicyEffectiveness => source.latest(HeadlineIndicator::PceInflation).await.ok(),
        _ => None,
    };

    let mut readings = Vec::with_capacity(inputs.len() + 1);
    let mut contributions = Vec::with_capacity(inputs.len());
    let mut last_error = None;

    for ((indicator, weight), result) in inputs.iter().zip(results) {
        let reading = match result {
            Ok(reading) => reading,
            Err(e) => {
                debug!("{}: {} unavailable: {}", component.name(), indicator.series_id(), e);
                last_error = Some(e);
                continue;
            }
        };

        let scored_value = match indicator {
            HeadlineIndicator::FederalFundsRate => {
                reading.value - pce.as_ref().map(|r| r.value).unwrap_or(INFLATION_TARGET)
            }
            _ => reading.value,
        };

        contributions.push(IndicatorContribution {
            indicator: *indicator,
            value: reading.value,
            period_date: reading.period_date,
            score: indicator_score(*indicator, scored_value),
            weight: *weight,
        });
        readings.push(reading);
    }
    readings.extend(pce);

    let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
    if contributions.is_empty() || total_weight <= 0.0 {
        return Err(last_error
            .unwrap_or_else(|| FetchError::NotFound(format!("no inputs for {}", component.name()))));
    }

    let weighted: f64 = contributions.iter().map(|c| c.score * c.weight).sum();
    let score = (weighted / total_weight).clamp(0.0, 100.0);

    debug!(
        "{} scored {:.1} from {}/{} indicators",
        component.name(),
        score,
        contributions.len(),
        inputs.len()
    );

    Ok(ComponentScore {
        component,
        score,
        contributions,
        readings,
        degraded: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicator_core::MemorySource;

    fn reading(indicator: HeadlineIndicator, value: f64) -> HeadlineReading {
        HeadlineReading {
            indicator,
            value,
            period_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_component_weights_sum_to_one() {
        for component in Component::ALL {
            let total: f64 = component.inputs().iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-9, "{}", component.name());
        }
    }

    #[test]
    fn test_every_indicator_feeds_a_component() {
        for indicator in HeadlineIndicator::ALL {
            let used = Component::ALL
                .iter()
                .any(|c| c.inputs().iter().any(|(i, _)| *i == indicator));
            assert!(used, "{} is not scored", indicator.series_id());
        }
    }

    #[test]
    fn test_gdp_buckets() {
        let gdp = HeadlineIndicator::GdpGrowth;
        assert_eq!(indicator_score(gdp, -0.5), 15.0);
        assert_eq!(indicator_score(gdp, 0.0), 35.0);
        assert_eq!(indicator_score(gdp, 1.5), 55.0);
        assert_eq!(indicator_score(gdp, 2.5), 75.0);
        assert_eq!(indicator_score(gdp, 3.5), 90.0);
        assert_eq!(indicator_score(gdp, 5.0), 80.0);
    }

    #[test]
    fn test_inflation_scored_by_distance_from_target() {
        let cpi = HeadlineIndicator::CpiInflation;
        assert_eq!(indicator_score(cpi, 2.2), 90.0);
        assert_eq!(indicator_score(cpi, 1.7), 90.0);
        assert_eq!(indicator_score(cpi, 2.8), 75.0);
        assert_eq!(indicator_score(cpi, 0.5), 55.0);
        assert_eq!(indicator_score(cpi, 6.5), 15.0);
        assert_eq!(indicator_score(cpi, f64::NAN), NEUTRAL_SCORE);
    }

    #[tokio::test]
    async fn test_growth_weighted_average() {
        let mut source = MemorySource::new();
        source.insert_headline(reading(HeadlineIndicator::GdpGrowth, 3.0));
        source.insert_headline(reading(HeadlineIndicator::IndustrialProduction, 1.0));
        source.insert_headline(reading(HeadlineIndicator::RetailSales, 3.0));
        source.insert_headline(reading(HeadlineIndicator::LeadingIndex, 0.5));

        let result = score_component(Component::GrowthMomentum, &source).await.unwrap();

        // 0.4 * 75 + 0.2 * 60 * 3
        assert!((result.score - 66.0).abs() < 1e-9);
        assert_eq!(result.contributions.len(), 4);
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn test_partial_inputs_reweight() {
        let mut source = MemorySource::new();
        source.insert_headline(reading(HeadlineIndicator::GdpGrowth, 3.0));
        source.insert_headline(reading(HeadlineIndicator::IndustrialProduction, 1.0));

        let result = score_component(Component::GrowthMomentum, &source).await.unwrap();

        // (0.4 * 75 + 0.2 * 60) / 0.6
        assert!((result.score - 70.0).abs() < 1e-9);
        assert_eq!(result.contributions.len(), 2);
    }

    #[tokio::test]
    async fn test_no_inputs_is_an_error() {
        let source = MemorySource::new();
        let result = score_component(Component::LaborHealth, &source).await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_policy_uses_real_rate() {
        let mut source = MemorySource::new();
        source.insert_headline(reading(HeadlineIndicator::FederalFundsRate, 5.25));
        source.insert_headline(reading(HeadlineIndicator::TenYearYield, 4.2));
        source.insert_headline(reading(HeadlineIndicator::PceInflation, 2.6));

        let result = score_component(Component::PolicyEffectiveness, &source).await.unwrap();

        // Real rate 2.65 scores 35, ten-year 4.2 scores 80
        assert!((result.score - (0.6 * 35.0 + 0.4 * 80.0)).abs() < 1e-9);
        assert_eq!(result.readings.len(), 3);

        // Without PCE the target stands in: real rate 3.25
        let mut no_pce = MemorySource::new();
        no_pce.insert_headline(reading(HeadlineIndicator::FederalFundsRate, 3.0));
        let result = score_component(Component::PolicyEffectiveness, &no_pce).await.unwrap();
        assert_eq!(result.contributions[0].score, 80.0);
    }
}
