//! In-memory observation store
//!
//! Backs tests and the runner binary. Headline readings fall back to the last
//! observation of the indicator's catalog series when none was set explicitly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    FetchError, HeadlineIndicator, HeadlineReading, HeadlineSource, IndicatorError, Observation,
    ObservationSource, Series, SeriesId,
};

/// Serialized form of a [`MemorySource`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub headlines: Vec<HeadlineReading>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<SeriesId, Series>,
    headlines: HashMap<HeadlineIndicator, HeadlineReading>,
    unavailable: HashSet<SeriesId>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group raw observations by series id
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self, IndicatorError> {
        let mut grouped: HashMap<SeriesId, Vec<Observation>> = HashMap::new();
        for obs in observations {
            grouped.entry(obs.series_id.clone()).or_default().push(obs);
        }

        let mut source = Self::new();
        for (series_id, obs) in grouped {
            let frequency = obs[0].frequency;
            source.insert_series(Series::new(series_id, frequency, obs)?);
        }
        Ok(source)
    }

    pub fn from_snapshot(snapshot: MemorySnapshot) -> Result<Self, IndicatorError> {
        let mut source = Self::from_observations(snapshot.observations)?;
        for reading in snapshot.headlines {
            source.insert_headline(reading);
        }
        Ok(source)
    }

    pub fn from_json(json: &str) -> Result<Self, IndicatorError> {
        let snapshot: MemorySnapshot = serde_json::from_str(json)
            .map_err(|e| IndicatorError::InvalidData(format!("Bad snapshot: {}", e)))?;
        Self::from_snapshot(snapshot)
    }

    pub fn insert_series(&mut self, series: Series) {
        self.series.insert(series.series_id().clone(), series);
    }

    pub fn insert_headline(&mut self, reading: HeadlineReading) {
        self.headlines.insert(reading.indicator, reading);
    }

    /// Make every fetch of `series_id` fail as if the upstream were down
    pub fn mark_unavailable(&mut self, series_id: impl Into<SeriesId>) {
        self.unavailable.insert(series_id.into());
    }

    pub fn series_ids(&self) -> Vec<SeriesId> {
        let mut ids: Vec<SeriesId> = self.series.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn check_available(&self, series_id: &SeriesId) -> Result<(), FetchError> {
        if self.unavailable.contains(series_id) {
            return Err(FetchError::Unavailable(series_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObservationSource for MemorySource {
    async fn fetch_series(&self, series_id: &SeriesId) -> Result<Series, FetchError> {
        self.check_available(series_id)?;
        self.series
            .get(series_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(series_id.to_string()))
    }
}

#[async_trait]
impl HeadlineSource for MemorySource {
    async fn latest(&self, indicator: HeadlineIndicator) -> Result<HeadlineReading, FetchError> {
        let series_id = SeriesId::from(indicator.series_id());
        self.check_available(&series_id)?;

        if let Some(reading) = self.headlines.get(&indicator) {
            return Ok(reading.clone());
        }

        self.series
            .get(&series_id)
            .and_then(|s| s.last())
            .map(|obs| HeadlineReading {
                indicator,
                value: obs.value,
                period_date: obs.period_date,
            })
            .ok_or_else(|| FetchError::NotFound(series_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frequency;
    use chrono::NaiveDate;

    const SNAPSHOT: &str = r#"{
        "observations": [
            {"series_id": "UNRATE", "period_date": "2024-01-01", "value": 3.7, "frequency": "monthly"},
            {"series_id": "UNRATE", "period_date": "2024-02-01", "value": 3.9, "frequency": "monthly"},
            {"series_id": "VIXCLS", "period_date": "2024-02-01", "value": 14.1, "frequency": "daily"}
        ],
        "headlines": [
            {"indicator": "gdp_growth", "value": 2.4, "period_date": "2023-12-31"}
        ]
    }"#;

    #[tokio::test]
    async fn test_snapshot_loading() {
        let source = MemorySource::from_json(SNAPSHOT).unwrap();

        let unrate = source.fetch_series(&SeriesId::from("UNRATE")).await.unwrap();
        assert_eq!(unrate.len(), 2);
        assert_eq!(unrate.frequency(), Frequency::Monthly);

        let gdp = source.latest(HeadlineIndicator::GdpGrowth).await.unwrap();
        assert_eq!(gdp.value, 2.4);

        // Falls back to the last observation of the catalog series
        let unemployment = source.latest(HeadlineIndicator::UnemploymentRate).await.unwrap();
        assert_eq!(unemployment.value, 3.9);
        assert_eq!(unemployment.period_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[tokio::test]
    async fn test_missing_and_unavailable() {
        let mut source = MemorySource::from_json(SNAPSHOT).unwrap();

        let missing = source.latest(HeadlineIndicator::HousingStarts).await;
        assert!(matches!(missing, Err(FetchError::NotFound(_))));

        source.mark_unavailable("VIXCLS");
        let down = source.latest(HeadlineIndicator::Vix).await;
        assert!(matches!(down, Err(FetchError::Unavailable(_))));
    }

    #[test]
    fn test_bad_json_is_invalid_data() {
        let result = MemorySource::from_json("{not json");
        assert!(matches!(result, Err(IndicatorError::InvalidData(_))));
    }
}
