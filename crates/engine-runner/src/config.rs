use anyhow::{Context, Result};
use chrono::NaiveDate;
use health_scorer::DEFAULT_CACHE_TTL_SECS;
use indicator_core::SeriesId;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// JSON observation snapshot to score
    pub snapshot_path: PathBuf,
    pub cache_ttl_secs: i64,
    /// Defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
    /// Empty means every catalog series in the snapshot
    pub signal_series: Vec<SeriesId>,
    pub json_logging: bool,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .context("SNAPSHOT_PATH must be set")?;

        let cache_ttl_secs = lookup("CACHE_TTL_SECS")
            .unwrap_or_else(|| DEFAULT_CACHE_TTL_SECS.to_string())
            .parse::<i64>()
            .context("CACHE_TTL_SECS must be an integer number of seconds")?;

        let as_of = lookup("AS_OF")
            .filter(|s| !s.trim().is_empty())
            .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"))
            .transpose()
            .context("AS_OF must be a YYYY-MM-DD date")?;

        let signal_series = lookup("SIGNAL_SERIES")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(SeriesId::from)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let json_logging = lookup("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            snapshot_path,
            cache_ttl_secs,
            as_of,
            signal_series,
            json_logging,
        })
    }
}
