//! engine-runner: score one observation snapshot and print the result as JSON.
//!
//! Usage:
//!   SNAPSHOT_PATH=data/snapshot.json cargo run -p engine-runner
//!   SNAPSHOT_PATH=data/snapshot.json AS_OF=2024-06-30 SIGNAL_SERIES=UNRATE,CPIAUCSL cargo run -p engine-runner

mod config;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use health_scorer::{CompositeHealthScorer, ScoreCache};
use indicator_core::{HeadlineIndicator, MemorySource, SeriesId};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::RunnerConfig;
use report::{indicator_reports, RunReport};

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "engine_runner=info,health_scorer=info".into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = RunnerConfig::from_env()?;
    init_logging(config.json_logging);

    let json = std::fs::read_to_string(&config.snapshot_path)
        .with_context(|| format!("Failed to read snapshot {}", config.snapshot_path.display()))?;
    let source = Arc::new(MemorySource::from_json(&json).context("Failed to load snapshot")?);

    let series_ids: Vec<SeriesId> = if config.signal_series.is_empty() {
        source
            .series_ids()
            .into_iter()
            .filter(|id| HeadlineIndicator::from_series_id(id.as_str()).is_some())
            .collect()
    } else {
        config.signal_series.clone()
    };

    info!(
        "Loaded {} series from {}, reporting on {}",
        source.series_ids().len(),
        config.snapshot_path.display(),
        series_ids.len()
    );

    let as_of = config.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let scorer = CompositeHealthScorer::new(source.clone(), source.clone())
        .with_cache(ScoreCache::new(config.cache_ttl_secs));

    let (health, (indicators, skipped)) = tokio::join!(
        scorer.score(as_of),
        indicator_reports(source.clone(), &series_ids),
    );

    let report = RunReport {
        health,
        indicators,
        skipped,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
