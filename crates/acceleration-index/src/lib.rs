//! Frequency-Normalized Acceleration Index (FNAI)
//!
//! Compares the velocity of the last three intervals to the velocity and
//! volatility of the trailing twelve months. An FNAI of +1 means recent
//! movement is one historical standard deviation faster than usual.
//!
//! A simple annualized-rate ratio is reported next to it. The two measure
//! different things and can disagree: when a series has been falling and the
//! fall slows, FNAI reads acceleration while the ratio reads deceleration.

use chrono::NaiveDate;
use indicator_core::{raw_changes, round_to, Frequency, RollingStatistics, Series, SeriesId};
use serde::{Deserialize, Serialize};

const MIN_POINTS: usize = 4;
const RECENT_INTERVALS: usize = 3;

/// FNAI interpretation band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccelerationBand {
    StrongAcceleration,
    ModerateAcceleration,
    Stable,
    ModerateDeceleration,
    StrongDeceleration,
}

impl AccelerationBand {
    pub fn from_fnai(fnai: f64) -> Self {
        match fnai {
            f if f > 1.0 => AccelerationBand::StrongAcceleration,
            f if f > 0.5 => AccelerationBand::ModerateAcceleration,
            f if f > -0.5 => AccelerationBand::Stable,
            f if f > -1.0 => AccelerationBand::ModerateDeceleration,
            _ => AccelerationBand::StrongDeceleration,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccelerationBand::StrongAcceleration => "Strong Acceleration",
            AccelerationBand::ModerateAcceleration => "Moderate Acceleration",
            AccelerationBand::Stable => "Stable",
            AccelerationBand::ModerateDeceleration => "Moderate Deceleration",
            AccelerationBand::StrongDeceleration => "Strong Deceleration",
        }
    }
}

/// Trend label of the simple annualized-rate ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateTrend {
    Accelerating,
    Stable,
    Decelerating,
}

impl RateTrend {
    pub fn from_ratio(ratio: Option<f64>) -> Self {
        match ratio {
            Some(r) if r > 1.2 => RateTrend::Accelerating,
            Some(r) if r < 0.8 => RateTrend::Decelerating,
            _ => RateTrend::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateTrend::Accelerating => "Accelerating",
            RateTrend::Stable => "Stable",
            RateTrend::Decelerating => "Decelerating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRatio {
    /// Recent velocity scaled to a year
    pub recent_rate: f64,
    /// Historical velocity scaled to a year
    pub historical_rate: f64,
    /// `None` when the historical rate is zero
    pub ratio: Option<f64>,
    pub trend: RateTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationResult {
    pub series_id: SeriesId,
    pub fnai: f64,
    pub recent_velocity: f64,
    pub historical_velocity: f64,
    pub historical_volatility: f64,
    pub band: AccelerationBand,
    pub interpretation: String,
    pub simple_ratio: SimpleRatio,
    /// Number of historical changes the baseline was computed from
    pub sample_size: usize,
    pub insufficient_data: bool,
    pub as_of: Option<NaiveDate>,
}

impl AccelerationResult {
    fn insufficient(series_id: SeriesId, points: usize, as_of: Option<NaiveDate>) -> Self {
        Self {
            series_id,
            fnai: 0.0,
            recent_velocity: 0.0,
            historical_velocity: 0.0,
            historical_volatility: 0.0,
            band: AccelerationBand::Stable,
            interpretation: format!(
                "Insufficient data for acceleration analysis: {} points (need {})",
                points, MIN_POINTS
            ),
            simple_ratio: SimpleRatio {
                recent_rate: 0.0,
                historical_rate: 0.0,
                ratio: None,
                trend: RateTrend::Stable,
            },
            sample_size: points.saturating_sub(1),
            insufficient_data: true,
            as_of,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccelerationIndex;

impl AccelerationIndex {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, series: &Series) -> AccelerationResult {
        let as_of = series.last().map(|o| o.period_date);
        self.calculate_values(series.series_id().clone(), &series.values(), series.frequency(), as_of)
    }

    pub fn calculate_values(
        &self,
        series_id: SeriesId,
        values: &[f64],
        frequency: Frequency,
        as_of: Option<NaiveDate>,
    ) -> AccelerationResult {
        let n = values.len();
        if n < MIN_POINTS {
            tracing::debug!("{}: {} points, FNAI needs {}", series_id, n, MIN_POINTS);
            return AccelerationResult::insufficient(series_id, n, as_of);
        }

        let recent_velocity = (values[n - 1] - values[n - 1 - RECENT_INTERVALS]) / RECENT_INTERVALS as f64;

        let periods = frequency.periods_per_year();
        let start = n.saturating_sub(periods + 1);
        let historical_changes = raw_changes(&values[start..]);
        let stats = RollingStatistics::compute(&historical_changes);
        let historical_velocity = stats.mean;
        let historical_volatility = stats.std_dev;

        let fnai = if historical_volatility == 0.0 {
            0.0
        } else {
            (recent_velocity - historical_velocity) / historical_volatility
        };
        let band = AccelerationBand::from_fnai(fnai);

        let recent_rate = recent_velocity * periods as f64;
        let historical_rate = historical_velocity * periods as f64;
        let ratio = if historical_rate == 0.0 {
            None
        } else {
            Some(recent_rate / historical_rate).filter(|r| r.is_finite())
        };

        let interpretation = format!(
            "{}: recent velocity {:+.3} vs historical {:+.3} per period ({:.2} sd)",
            band.as_str(),
            recent_velocity,
            historical_velocity,
            fnai
        );

        AccelerationResult {
            series_id,
            fnai: round_to(fnai, 4),
            recent_velocity: round_to(recent_velocity, 4),
            historical_velocity: round_to(historical_velocity, 4),
            historical_volatility: round_to(historical_volatility, 4),
            band,
            interpretation,
            simple_ratio: SimpleRatio {
                recent_rate: round_to(recent_rate, 4),
                historical_rate: round_to(historical_rate, 4),
                ratio: ratio.map(|r| round_to(r, 4)),
                trend: RateTrend::from_ratio(ratio),
            },
            sample_size: historical_changes.len(),
            insufficient_data: false,
            as_of,
        }
    }
}
