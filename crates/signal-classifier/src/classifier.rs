//! Per-indicator signal classification
//!
//! Reconciles a level z-score and a trend (delta) z-score into one verdict.
//! Level signals follow the sign of the z-score for every metric; only the
//! trend signal is flipped for inverse metrics, where a rising value is a
//! worsening trend. Inflation, unemployment and interest-rate metrics get
//! their own override rules before the general resolver runs.

use indicator_core::{Confidence, Directionality};
use serde::{Deserialize, Serialize};

const NEUTRAL_BAND: f64 = 0.5;

const INFLATION_KEYWORDS: [&str; 4] = ["inflation", "cpi", "pce", "ppi"];
const UNEMPLOYMENT_KEYWORDS: [&str; 2] = ["unemployment", "unrate"];
const RATE_KEYWORDS: [&str; 2] = ["yield", "rate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Positive => "positive",
            Signal::Negative => "negative",
            Signal::Mixed => "mixed",
            Signal::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
    Watch,
    Normal,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "critical",
            AlertLevel::Warning => "warning",
            AlertLevel::Watch => "watch",
            AlertLevel::Normal => "normal",
        }
    }
}

/// Which override rule set applies to a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    Inflation,
    Unemployment,
    Rate,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalClassification {
    pub metric: String,
    pub directionality: Directionality,
    pub metric_kind: MetricKind,
    pub level_signal: Signal,
    pub trend_signal: Signal,
    pub overall_signal: Signal,
    pub confidence: Confidence,
    pub alert_level: AlertLevel,
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Inverse when the name mentions unemployment, inflation, price indices,
/// yields or rates. Matching is on the lowercase name only.
pub fn directionality_of(metric: &str) -> Directionality {
    let name = metric.to_lowercase();
    if contains_any(&name, &INFLATION_KEYWORDS)
        || contains_any(&name, &UNEMPLOYMENT_KEYWORDS)
        || contains_any(&name, &RATE_KEYWORDS)
    {
        Directionality::Inverse
    } else {
        Directionality::Direct
    }
}

/// First match wins: inflation, then unemployment, then rate.
pub fn metric_kind_of(metric: &str) -> MetricKind {
    let name = metric.to_lowercase();
    if contains_any(&name, &INFLATION_KEYWORDS) {
        MetricKind::Inflation
    } else if contains_any(&name, &UNEMPLOYMENT_KEYWORDS) {
        MetricKind::Unemployment
    } else if contains_any(&name, &RATE_KEYWORDS) {
        MetricKind::Rate
    } else {
        MetricKind::General
    }
}

/// Sign of the level z-score, identical for direct and inverse metrics
pub fn level_signal(z_score: f64) -> Signal {
    if z_score.abs() < NEUTRAL_BAND {
        Signal::Neutral
    } else if z_score > 0.0 {
        Signal::Positive
    } else {
        Signal::Negative
    }
}

pub fn trend_signal(delta_z_score: f64, directionality: Directionality) -> Signal {
    if delta_z_score.abs() < NEUTRAL_BAND {
        return Signal::Neutral;
    }
    let rising = delta_z_score > 0.0;
    match (directionality, rising) {
        (Directionality::Direct, true) | (Directionality::Inverse, false) => Signal::Positive,
        (Directionality::Direct, false) | (Directionality::Inverse, true) => Signal::Negative,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalClassifier;

impl SignalClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Non-finite z-scores are read as 0.
    pub fn classify(&self, z_score: f64, delta_z_score: f64, metric: &str) -> SignalClassification {
        let z = if z_score.is_finite() { z_score } else { 0.0 };
        let dz = if delta_z_score.is_finite() { delta_z_score } else { 0.0 };

        let directionality = directionality_of(metric);
        let metric_kind = metric_kind_of(metric);
        let level = level_signal(z);
        let trend = trend_signal(dz, directionality);

        let overall_signal = match metric_kind {
            MetricKind::Inflation => resolve_inflation(z, dz, level, trend),
            MetricKind::Unemployment => resolve_unemployment(z, dz, level, trend),
            MetricKind::Rate => resolve_rate(z, dz, level, trend),
            MetricKind::General => resolve_general(z, dz, level, trend),
        };

        let magnitude = z.abs().max(dz.abs());
        let confidence = if magnitude > 2.0 {
            Confidence::High
        } else if magnitude > 1.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        let alert_level = match overall_signal {
            Signal::Negative if magnitude > 2.0 => AlertLevel::Critical,
            Signal::Negative if magnitude > 1.5 => AlertLevel::Warning,
            Signal::Mixed if magnitude > 1.5 => AlertLevel::Watch,
            _ => AlertLevel::Normal,
        };

        tracing::debug!(
            "{} z={:.2} dz={:.2} -> {} ({})",
            metric,
            z,
            dz,
            overall_signal.as_str(),
            alert_level.as_str()
        );

        SignalClassification {
            metric: metric.to_string(),
            directionality,
            metric_kind,
            level_signal: level,
            trend_signal: trend,
            overall_signal,
            confidence,
            alert_level,
        }
    }
}

/// Agreement wins; otherwise a signal must be over 1.5x the other and above 1 to win.
fn resolve_general(z: f64, dz: f64, level: Signal, trend: Signal) -> Signal {
    if level == trend {
        return level;
    }

    let (level_mag, trend_mag) = (z.abs(), dz.abs());
    if level_mag > 1.5 * trend_mag && level_mag > 1.0 {
        level
    } else if trend_mag > 1.5 * level_mag && trend_mag > 1.0 {
        trend
    } else {
        Signal::Mixed
    }
}

fn resolve_inflation(z: f64, dz: f64, level: Signal, trend: Signal) -> Signal {
    // Rapid acceleration outweighs a benign level
    if dz > 1.5 && z > -1.0 {
        return Signal::Negative;
    }
    if z > 0.5 && dz <= 0.5 {
        return Signal::Positive;
    }
    if level != trend {
        return if dz.abs() > z.abs() && dz.abs() > 1.0 {
            trend
        } else {
            Signal::Mixed
        };
    }
    resolve_general(z, dz, level, trend)
}

fn resolve_unemployment(z: f64, dz: f64, level: Signal, trend: Signal) -> Signal {
    if z > 1.0 && dz > 1.5 {
        return Signal::Mixed;
    }
    if z < -1.0 && dz < -1.0 {
        return Signal::Mixed;
    }
    resolve_general(z, dz, level, trend)
}

fn resolve_rate(z: f64, dz: f64, level: Signal, trend: Signal) -> Signal {
    // Extremes are bad in either direction
    if z.abs() > 2.0 || dz.abs() > 2.0 {
        return Signal::Negative;
    }
    if z.abs() < 1.0 && dz.abs() < 1.0 {
        return Signal::Positive;
    }
    resolve_general(z, dz, level, trend)
}
