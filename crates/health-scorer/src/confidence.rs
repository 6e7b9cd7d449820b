//! Confidence of a composite score and the interval derived from it

use chrono::NaiveDate;
use statrs::statistics::Statistics;

/// Only readings newer than this many days count towards completeness
pub const FRESH_WITHIN_DAYS: i64 = 30;

const MIN_CONFIDENCE: f64 = 30.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Confidence in `[30,95]` from data completeness, mean reading age and
/// agreement between component scores.
///
/// `reading_dates` holds one period date per distinct indicator fetched;
/// `expected` is how many distinct indicators the components ask for.
pub fn composite_confidence(
    reading_dates: &[NaiveDate],
    expected: usize,
    component_scores: &[f64],
    as_of: NaiveDate,
) -> f64 {
    let ages: Vec<f64> = reading_dates
        .iter()
        .map(|d| (as_of - *d).num_days().max(0) as f64)
        .collect();

    let fresh = ages.iter().filter(|a| **a < FRESH_WITHIN_DAYS as f64).count();
    let completeness = if expected == 0 {
        0.0
    } else {
        fresh as f64 / expected as f64 * 100.0
    };
    let mut confidence = completeness * 0.6;

    let mean_age = if ages.is_empty() { None } else { Some(ages.iter().mean()) };
    confidence += match mean_age {
        Some(age) if age < 7.0 => 20.0,
        Some(age) if age < 15.0 => 10.0,
        _ => -10.0,
    };

    if component_scores.len() > 1 {
        let variance = component_scores.iter().population_variance();
        if variance < 100.0 {
            confidence += 10.0;
        } else if variance > 400.0 {
            confidence -= 15.0;
        }
    }

    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// `[score - margin, score + margin]` with `margin = (100 - confidence) / 10`,
/// clamped to `[0,100]`
pub fn confidence_range(score: f64, confidence: f64) -> [f64; 2] {
    let margin = (100.0 - confidence) / 10.0;
    [(score - margin).clamp(0.0, 100.0), (score + margin).clamp(0.0, 100.0)]
}
