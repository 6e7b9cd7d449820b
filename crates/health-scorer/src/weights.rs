use economic_regime_detector::Regime;
use serde::{Deserialize, Serialize};

use crate::Component;

const SLOWDOWN_SHIFT: f64 = 0.05;

/// Component weights, non-negative and summing to one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightStructure {
    pub growth_momentum: f64,
    pub financial_stress: f64,
    pub labor_health: f64,
    pub inflation_trajectory: f64,
    pub policy_effectiveness: f64,
    /// Computed and reported but weighted out
    pub economic_expectations: f64,
}

impl Default for WeightStructure {
    fn default() -> Self {
        Self {
            growth_momentum: 0.30,
            financial_stress: 0.25,
            labor_health: 0.20,
            inflation_trajectory: 0.15,
            policy_effectiveness: 0.10,
            economic_expectations: 0.0,
        }
    }
}

impl WeightStructure {
    /// Base weights adjusted for the regime, then normalized
    pub fn for_regime(regime: Regime) -> Self {
        let mut weights = Self::default();
        if regime == Regime::Slowdown {
            weights.financial_stress += SLOWDOWN_SHIFT;
            weights.economic_expectations += SLOWDOWN_SHIFT;
            weights.growth_momentum -= SLOWDOWN_SHIFT;
            weights.inflation_trajectory -= SLOWDOWN_SHIFT;
        }
        weights.normalize()
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::GrowthMomentum => self.growth_momentum,
            Component::FinancialStress => self.financial_stress,
            Component::LaborHealth => self.labor_health,
            Component::InflationTrajectory => self.inflation_trajectory,
            Component::PolicyEffectiveness => self.policy_effectiveness,
            Component::EconomicExpectations => self.economic_expectations,
        }
    }

    fn get_mut(&mut self, component: Component) -> &mut f64 {
        match component {
            Component::GrowthMomentum => &mut self.growth_momentum,
            Component::FinancialStress => &mut self.financial_stress,
            Component::LaborHealth => &mut self.labor_health,
            Component::InflationTrajectory => &mut self.inflation_trajectory,
            Component::PolicyEffectiveness => &mut self.policy_effectiveness,
            Component::EconomicExpectations => &mut self.economic_expectations,
        }
    }

    pub fn sum(&self) -> f64 {
        Component::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Clamp negatives to zero and rescale to sum one. All-zero input falls
    /// back to the base weights.
    pub fn normalize(mut self) -> Self {
        for component in Component::ALL {
            let w = self.get_mut(component);
            if !w.is_finite() || *w < 0.0 {
                *w = 0.0;
            }
        }

        let total = self.sum();
        if total <= 0.0 {
            return Self::default();
        }
        for component in Component::ALL {
            *self.get_mut(component) /= total;
        }
        self
    }
}
