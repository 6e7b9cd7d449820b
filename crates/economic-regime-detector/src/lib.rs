//! Macro regime detection
//!
//! Counts recession, slowdown and expansion signals from GDP growth and the
//! unemployment-rate delta z-score. The employment-population ratio is
//! fetched and reported alongside but casts no signal.
//! Recomputed every scoring cycle; nothing is carried between cycles.

use delta_zscore::DeltaZScoreEngine;
use indicator_core::{
    HeadlineIndicator, HeadlineSource, IndicatorError, ObservationSource, SeriesId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Macroeconomic cycle classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Expansion,
    Slowdown,
    Recession,
    /// Reserved; no current rule produces it
    Recovery,
}

impl Regime {
    pub fn name(&self) -> &'static str {
        match self {
            Regime::Expansion => "Expansion",
            Regime::Slowdown => "Slowdown",
            Regime::Recession => "Recession",
            Regime::Recovery => "Recovery",
        }
    }
}

/// Latest headline readings the detector classifies from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegimeInputs {
    /// Annualized real GDP growth, percent
    pub gdp_growth: Option<f64>,
    pub unemployment_z: Option<f64>,
    /// Informational only
    pub employment_ratio_z: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegimeSignals {
    pub recession: u32,
    pub slowdown: u32,
    pub expansion: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: Regime,
    pub signals: RegimeSignals,
    pub inputs: RegimeInputs,
    /// Set when an input could not be obtained and the default was used
    pub degraded: bool,
    pub reasoning: String,
}

impl RegimeAssessment {
    fn fallback(inputs: RegimeInputs, reason: String) -> Self {
        Self {
            regime: Regime::Expansion,
            signals: RegimeSignals::default(),
            inputs,
            degraded: true,
            reasoning: format!("Defaulted to expansion: {}", reason),
        }
    }
}

#[derive(Default)]
pub struct RegimeDetector {
    engine: DeltaZScoreEngine,
}

impl RegimeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count signals and pick the regime. Missing inputs contribute nothing.
    pub fn classify(&self, inputs: RegimeInputs) -> RegimeAssessment {
        let mut signals = RegimeSignals::default();

        if let Some(gdp) = inputs.gdp_growth {
            if gdp < 0.0 {
                signals.recession += 2;
            } else if gdp < 1.5 {
                signals.slowdown += 1;
            } else if gdp > 3.0 {
                signals.expansion += 1;
            }
        }

        if let Some(z) = inputs.unemployment_z {
            if z > 1.5 {
                signals.recession += 1;
            } else if z < -1.5 {
                signals.expansion += 1;
            }
        }

        let regime = if signals.recession >= 2 {
            Regime::Recession
        } else if signals.slowdown >= 2 {
            // GDP casts at most one slowdown signal today
            Regime::Slowdown
        } else {
            // Expansion with or without expansion signals
            Regime::Expansion
        };

        let reasoning = format!(
            "{} (recession signals: {}, slowdown signals: {}, expansion signals: {})",
            regime.name(),
            signals.recession,
            signals.slowdown,
            signals.expansion
        );

        RegimeAssessment {
            regime,
            signals,
            inputs,
            degraded: false,
            reasoning,
        }
    }

    /// Fetch inputs and classify. Never fails: any missing input yields a
    /// degraded expansion assessment.
    pub async fn detect(
        &self,
        headlines: &dyn HeadlineSource,
        observations: &dyn ObservationSource,
    ) -> RegimeAssessment {
        let (gdp, unemployment, employment_ratio) = tokio::join!(
            headlines.latest(HeadlineIndicator::GdpGrowth),
            self.delta_z(observations, HeadlineIndicator::UnemploymentRate),
            self.delta_z(observations, HeadlineIndicator::EmploymentPopulationRatio),
        );

        let inputs = RegimeInputs {
            gdp_growth: gdp.as_ref().ok().map(|r| r.value),
            unemployment_z: unemployment.as_ref().ok().copied(),
            employment_ratio_z: employment_ratio.as_ref().ok().copied(),
        };

        let failure = gdp
            .err()
            .map(IndicatorError::from)
            .or_else(|| unemployment.err())
            .or_else(|| employment_ratio.err());

        if let Some(e) = failure {
            warn!("Regime detection degraded: {}", e);
            return RegimeAssessment::fallback(inputs, e.to_string());
        }

        let assessment = self.classify(inputs);
        debug!("Regime: {}", assessment.reasoning);
        assessment
    }

    async fn delta_z(
        &self,
        observations: &dyn ObservationSource,
        indicator: HeadlineIndicator,
    ) -> Result<f64, IndicatorError> {
        let series = observations
            .fetch_series(&SeriesId::from(indicator.series_id()))
            .await?;
        Ok(self.engine.calculate(&series)?.delta_z_score)
    }
}
