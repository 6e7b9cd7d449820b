use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{HeadlineIndicator, IndicatorError};

/// Identifier of an observation series (FRED series id or vendor symbol)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SeriesId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Release frequency of a series. Drives window sizing everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Number of period-over-period deltas kept in the rolling window
    pub fn delta_window(&self) -> usize {
        match self {
            Frequency::Daily => 252,
            Frequency::Weekly => 104,
            Frequency::Monthly => 60,
            Frequency::Quarterly => 40,
        }
    }

    /// Observations per twelve months
    pub fn periods_per_year(&self) -> usize {
        match self {
            Frequency::Daily => 252,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
        }
    }

    /// Observations per three months
    pub fn periods_per_quarter(&self) -> usize {
        match self {
            Frequency::Daily => 63,
            Frequency::Weekly => 13,
            Frequency::Monthly => 3,
            Frequency::Quarterly => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        }
    }
}

impl FromStr for Frequency {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            "quarterly" | "q" => Ok(Frequency::Quarterly),
            other => Err(IndicatorError::InvalidData(format!("Unknown frequency: {}", other))),
        }
    }
}

/// A single recorded value of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub series_id: SeriesId,
    pub period_date: NaiveDate,
    pub value: f64,
    pub frequency: Frequency,
}

/// Chronologically ordered observations of one series, unique by `period_date`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    series_id: SeriesId,
    frequency: Frequency,
    observations: Vec<Observation>,
}

impl Series {
    /// Build a series, sorting ascending and keeping the last observation supplied
    /// for any repeated `period_date`. Non-finite values are dropped.
    pub fn new(
        series_id: SeriesId,
        frequency: Frequency,
        observations: Vec<Observation>,
    ) -> Result<Self, IndicatorError> {
        let mut valid = Vec::with_capacity(observations.len());
        for obs in observations {
            if obs.series_id != series_id {
                return Err(IndicatorError::InvalidData(format!(
                    "Observation for {} supplied to series {}",
                    obs.series_id, series_id
                )));
            }
            if obs.frequency != frequency {
                return Err(IndicatorError::InvalidData(format!(
                    "Mixed frequencies in {}: {} vs {}",
                    series_id,
                    obs.frequency.as_str(),
                    frequency.as_str()
                )));
            }
            if !obs.value.is_finite() {
                tracing::debug!("Dropping non-finite value for {} on {}", series_id, obs.period_date);
                continue;
            }
            valid.push(obs);
        }

        // Stable sort keeps supply order among equal dates, so the last push wins below
        valid.sort_by_key(|o| o.period_date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(valid.len());
        for obs in valid {
            match deduped.last_mut() {
                Some(prev) if prev.period_date == obs.period_date => *prev = obs,
                _ => deduped.push(obs),
            }
        }

        Ok(Self {
            series_id,
            frequency,
            observations: deduped,
        })
    }

    /// Build a series from `(date, value)` pairs
    pub fn from_points(
        series_id: impl Into<SeriesId>,
        frequency: Frequency,
        points: &[(NaiveDate, f64)],
    ) -> Result<Self, IndicatorError> {
        let series_id = series_id.into();
        let observations = points
            .iter()
            .map(|&(period_date, value)| Observation {
                series_id: series_id.clone(),
                period_date,
                value,
                frequency,
            })
            .collect();
        Self::new(series_id, frequency, observations)
    }

    pub fn series_id(&self) -> &SeriesId {
        &self.series_id
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Three-band confidence label shared by the z-score engine and the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// Latest value of a headline indicator as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineReading {
    pub indicator: HeadlineIndicator,
    pub value: f64,
    pub period_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let series = Series::from_points(
            "UNRATE",
            Frequency::Monthly,
            &[
                (date(2024, 3, 1), 3.9),
                (date(2024, 1, 1), 3.7),
                (date(2024, 2, 1), 3.8),
                (date(2024, 3, 1), 4.0),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), vec![3.7, 3.8, 4.0]);
        assert_eq!(series.last().unwrap().period_date, date(2024, 3, 1));
    }

    #[test]
    fn test_series_rejects_mixed_frequency() {
        let obs = vec![
            Observation {
                series_id: SeriesId::from("GDP"),
                period_date: date(2024, 1, 1),
                value: 1.0,
                frequency: Frequency::Quarterly,
            },
            Observation {
                series_id: SeriesId::from("GDP"),
                period_date: date(2024, 4, 1),
                value: 1.2,
                frequency: Frequency::Monthly,
            },
        ];

        let result = Series::new(SeriesId::from("GDP"), Frequency::Quarterly, obs);
        assert!(matches!(result, Err(IndicatorError::InvalidData(_))));
    }

    #[test]
    fn test_series_drops_non_finite() {
        let series = Series::from_points(
            "VIXCLS",
            Frequency::Daily,
            &[(date(2024, 1, 2), 13.2), (date(2024, 1, 3), f64::NAN)],
        )
        .unwrap();

        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_frequency_windows() {
        assert_eq!(Frequency::Daily.delta_window(), 252);
        assert_eq!(Frequency::Weekly.delta_window(), 104);
        assert_eq!(Frequency::Monthly.delta_window(), 60);
        assert_eq!(Frequency::Quarterly.delta_window(), 40);
        assert_eq!(Frequency::Weekly.periods_per_year(), 52);
        assert_eq!("Quarterly".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert!("hourly".parse::<Frequency>().is_err());
    }
}
