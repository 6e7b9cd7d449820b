use chrono::{Datelike, Duration, NaiveDate};
use indicator_core::{round_to, Frequency, HeadlineIndicator, IndicatorError, Series, SeriesId};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Level statistics of the latest reading of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMetrics {
    pub series_id: SeriesId,
    pub current: f64,
    pub prior: f64,
    /// Z-score of the current level against the trailing twelve months
    pub level_z_score: f64,
    pub yoy_change: Option<f64>,
    /// Three-month change compounded to an annual rate
    pub annualized_3m_rate: Option<f64>,
    pub vs_prior: f64,
    pub forecast: Option<f64>,
    pub vs_forecast: Option<f64>,
    pub last_release: NaiveDate,
    pub next_release: NaiveDate,
}

impl LevelMetrics {
    /// Uses the catalog consensus forecast when the series is a headline indicator
    pub fn from_series(series: &Series) -> Result<Self, IndicatorError> {
        let forecast = HeadlineIndicator::from_series_id(series.series_id().as_str())
            .and_then(|i| i.definition().forecast);
        Self::compute(series, forecast)
    }

    pub fn compute(series: &Series, forecast: Option<f64>) -> Result<Self, IndicatorError> {
        let observations = series.observations();
        if observations.len() < 2 {
            return Err(IndicatorError::InsufficientData(format!(
                "{}: {} observations (need 2)",
                series.series_id(),
                observations.len()
            )));
        }

        let values = series.values();
        let frequency = series.frequency();
        let n = values.len();
        let current = values[n - 1];
        let prior = values[n - 2];
        let last_release = observations[n - 1].period_date;

        let yoy_change = change_over(&values, frequency.periods_per_year())
            .map(|ratio| round_to((ratio - 1.0) * 100.0, 2));

        let quarter = frequency.periods_per_quarter();
        let annualized_3m_rate = change_over(&values, quarter)
            .filter(|ratio| *ratio > 0.0)
            .map(|ratio| {
                let exponent = frequency.periods_per_year() as f64 / quarter as f64;
                (ratio.powf(exponent) - 1.0) * 100.0
            })
            .filter(|rate| rate.is_finite())
            .map(|rate| round_to(rate, 2));

        Ok(Self {
            series_id: series.series_id().clone(),
            current,
            prior,
            level_z_score: round_to(level_z_score(&values, frequency), 2),
            yoy_change,
            annualized_3m_rate,
            vs_prior: round_to(current - prior, 2),
            forecast,
            vs_forecast: forecast.map(|f| round_to(current - f, 2)),
            last_release,
            next_release: estimate_next_release(last_release, frequency),
        })
    }
}

/// `current / value periods back`, if that far back exists and is non-zero
fn change_over(values: &[f64], periods: usize) -> Option<f64> {
    let n = values.len();
    if periods == 0 || n <= periods {
        return None;
    }
    let base = values[n - 1 - periods];
    if base == 0.0 {
        return None;
    }
    let ratio = values[n - 1] / base;
    ratio.is_finite().then_some(ratio)
}

/// Z-score of the latest value against the trailing twelve months (population
/// standard deviation). Zero without a full year of history or without variance.
pub fn level_z_score(values: &[f64], frequency: Frequency) -> f64 {
    let window = frequency.periods_per_year();
    if values.len() < window {
        return 0.0;
    }

    let recent = &values[values.len() - window..];
    let mean = recent.mean();
    let std_dev = recent.population_std_dev();
    if !std_dev.is_finite() || std_dev == 0.0 {
        return 0.0;
    }

    (values[values.len() - 1] - mean) / std_dev
}

/// Rough date of the next release after `last`
pub fn estimate_next_release(last: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => last + Duration::days(1),
        Frequency::Weekly => last + Duration::days(7),
        Frequency::Monthly => {
            let shifted = last + Duration::days(32);
            shifted.with_day(15).unwrap_or(shifted)
        }
        Frequency::Quarterly => last + Duration::days(90),
    }
}
