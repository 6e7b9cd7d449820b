//! Headline indicator catalog
//!
//! Every series the component scorers and the regime detector consume is a
//! variant of [`HeadlineIndicator`]. Its static metadata lives in one exhaustive
//! match, so a new indicator cannot be added without describing it.

use serde::{Deserialize, Serialize};

use crate::Frequency;

/// Whether a rising raw value is economically good (`Direct`) or bad (`Inverse`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    Direct,
    Inverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorCategory {
    Growth,
    FinancialConditions,
    Labor,
    Inflation,
    MonetaryPolicy,
    Sentiment,
}

/// Business-cycle timing of an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorType {
    Leading,
    Coincident,
    Lagging,
}

/// Static description of a headline indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorDefinition {
    pub series_id: &'static str,
    pub name: &'static str,
    pub category: IndicatorCategory,
    pub indicator_type: IndicatorType,
    pub frequency: Frequency,
    pub unit: &'static str,
    pub directionality: Directionality,
    /// Consensus forecast used for variance-vs-forecast reporting
    pub forecast: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadlineIndicator {
    // Growth
    GdpGrowth,
    IndustrialProduction,
    RetailSales,
    LeadingIndex,
    // Financial conditions
    FinancialStressIndex,
    HighYieldSpread,
    Vix,
    YieldCurveSpread,
    // Labor
    UnemploymentRate,
    NonfarmPayrolls,
    InitialClaims,
    EmploymentPopulationRatio,
    // Inflation
    CpiInflation,
    CoreCpiInflation,
    PceInflation,
    PpiInflation,
    // Monetary policy
    FederalFundsRate,
    TenYearYield,
    // Expectations
    ConsumerSentiment,
    ConsumerConfidence,
    BuildingPermits,
    HousingStarts,
}

impl HeadlineIndicator {
    pub const ALL: [HeadlineIndicator; 22] = [
        HeadlineIndicator::GdpGrowth,
        HeadlineIndicator::IndustrialProduction,
        HeadlineIndicator::RetailSales,
        HeadlineIndicator::LeadingIndex,
        HeadlineIndicator::FinancialStressIndex,
        HeadlineIndicator::HighYieldSpread,
        HeadlineIndicator::Vix,
        HeadlineIndicator::YieldCurveSpread,
        HeadlineIndicator::UnemploymentRate,
        HeadlineIndicator::NonfarmPayrolls,
        HeadlineIndicator::InitialClaims,
        HeadlineIndicator::EmploymentPopulationRatio,
        HeadlineIndicator::CpiInflation,
        HeadlineIndicator::CoreCpiInflation,
        HeadlineIndicator::PceInflation,
        HeadlineIndicator::PpiInflation,
        HeadlineIndicator::FederalFundsRate,
        HeadlineIndicator::TenYearYield,
        HeadlineIndicator::ConsumerSentiment,
        HeadlineIndicator::ConsumerConfidence,
        HeadlineIndicator::BuildingPermits,
        HeadlineIndicator::HousingStarts,
    ];

    pub fn definition(&self) -> IndicatorDefinition {
        use Directionality::*;
        use Frequency::*;
        use IndicatorCategory as C;
        use IndicatorType as T;

        let (series_id, name, category, indicator_type, frequency, unit, directionality, forecast) =
            match self {
                HeadlineIndicator::GdpGrowth => (
                    "A191RL1Q225SBEA", "GDP Growth Rate", C::Growth, T::Coincident, Quarterly, "percent", Direct, Some(1.0),
                ),
                HeadlineIndicator::IndustrialProduction => (
                    "INDPRO", "Industrial Production YoY", C::Growth, T::Coincident, Monthly, "percent", Direct, Some(1.0),
                ),
                HeadlineIndicator::RetailSales => (
                    "RSAFS", "Retail Sales YoY", C::Growth, T::Coincident, Monthly, "percent", Direct, None,
                ),
                HeadlineIndicator::LeadingIndex => (
                    "USSLIND", "Leading Economic Index", C::Growth, T::Leading, Monthly, "percent", Direct, None,
                ),
                HeadlineIndicator::FinancialStressIndex => (
                    "STLFSI4", "St. Louis Fed Financial Stress Index", C::FinancialConditions, T::Coincident, Weekly, "index", Inverse, None,
                ),
                HeadlineIndicator::HighYieldSpread => (
                    "BAMLH0A0HYM2", "High Yield Credit Spread", C::FinancialConditions, T::Leading, Daily, "percent", Inverse, None,
                ),
                HeadlineIndicator::Vix => (
                    "VIXCLS", "CBOE Volatility Index", C::FinancialConditions, T::Coincident, Daily, "index", Inverse, None,
                ),
                HeadlineIndicator::YieldCurveSpread => (
                    "T10Y2Y", "10Y-2Y Treasury Spread", C::FinancialConditions, T::Leading, Daily, "percent", Direct, None,
                ),
                HeadlineIndicator::UnemploymentRate => (
                    "UNRATE", "Unemployment Rate", C::Labor, T::Lagging, Monthly, "percent", Inverse, Some(4.3),
                ),
                HeadlineIndicator::NonfarmPayrolls => (
                    "PAYEMS", "Nonfarm Payrolls", C::Labor, T::Coincident, Monthly, "thousands", Direct, Some(180.0),
                ),
                HeadlineIndicator::InitialClaims => (
                    "ICSA", "Initial Jobless Claims", C::Labor, T::Leading, Weekly, "thousands", Inverse, None,
                ),
                HeadlineIndicator::EmploymentPopulationRatio => (
                    "EMRATIO", "Employment-Population Ratio", C::Labor, T::Coincident, Monthly, "percent", Direct, None,
                ),
                HeadlineIndicator::CpiInflation => (
                    "CPIAUCSL", "CPI Year-over-Year", C::Inflation, T::Lagging, Monthly, "percent", Inverse, Some(2.7),
                ),
                HeadlineIndicator::CoreCpiInflation => (
                    "CPILFESL", "Core CPI Year-over-Year", C::Inflation, T::Lagging, Monthly, "percent", Inverse, Some(3.0),
                ),
                HeadlineIndicator::PceInflation => (
                    "PCEPI", "PCE Price Index YoY", C::Inflation, T::Lagging, Monthly, "percent", Inverse, Some(2.2),
                ),
                HeadlineIndicator::PpiInflation => (
                    "PPIACO", "PPI Year-over-Year", C::Inflation, T::Coincident, Monthly, "percent", Inverse, None,
                ),
                HeadlineIndicator::FederalFundsRate => (
                    "FEDFUNDS", "Federal Funds Rate", C::MonetaryPolicy, T::Coincident, Monthly, "percent", Inverse, Some(4.25),
                ),
                HeadlineIndicator::TenYearYield => (
                    "GS10", "10-Year Treasury Yield", C::MonetaryPolicy, T::Leading, Daily, "percent", Inverse, Some(4.25),
                ),
                HeadlineIndicator::ConsumerSentiment => (
                    "UMCSENT", "Michigan Consumer Sentiment", C::Sentiment, T::Leading, Monthly, "index", Direct, Some(61.5),
                ),
                HeadlineIndicator::ConsumerConfidence => (
                    "CSCICP03USM665S", "Consumer Confidence Index", C::Sentiment, T::Leading, Monthly, "index", Direct, Some(93.5),
                ),
                HeadlineIndicator::BuildingPermits => (
                    "PERMIT", "Building Permits", C::Growth, T::Leading, Monthly, "thousands", Direct, Some(1390.0),
                ),
                HeadlineIndicator::HousingStarts => (
                    "HOUST", "Housing Starts", C::Growth, T::Leading, Monthly, "thousands", Direct, Some(1350.0),
                ),
            };

        IndicatorDefinition {
            series_id,
            name,
            category,
            indicator_type,
            frequency,
            unit,
            directionality,
            forecast,
        }
    }

    pub fn series_id(&self) -> &'static str {
        self.definition().series_id
    }

    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    pub fn frequency(&self) -> Frequency {
        self.definition().frequency
    }

    pub fn directionality(&self) -> Directionality {
        self.definition().directionality
    }

    pub fn category(&self) -> IndicatorCategory {
        self.definition().category
    }

    /// Look up by FRED series id (case-insensitive)
    pub fn from_series_id(series_id: &str) -> Option<Self> {
        let wanted = series_id.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.series_id().eq_ignore_ascii_case(wanted))
    }

    /// Look up by display name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.name().eq_ignore_ascii_case(wanted))
    }
}
