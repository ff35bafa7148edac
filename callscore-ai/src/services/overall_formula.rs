//! Weighted overall score
//!
//! Defines what `overall` would be if derived from the five sub-scores.
//! The live pipeline stores the model's self-reported `overall` instead and
//! does not call this; the two are kept apart on purpose until product
//! decides which one is authoritative.

use super::score_aggregator::round_half_up;

pub const PITCH_WEIGHT: f64 = 0.15;
pub const CONVERSION_WEIGHT: f64 = 0.25;
pub const RAPPORT_WEIGHT: f64 = 0.15;
pub const OBJECTION_WEIGHT: f64 = 0.20;
pub const CLOSING_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub pitch: f64,
    pub conversion: f64,
    pub rapport: f64,
    pub objection: f64,
    pub closing: f64,
}

/// Weighted sum of the sub-scores, rounded half-up
pub fn compute_weighted_overall(scores: &SubScores) -> f64 {
    round_half_up(
        scores.pitch * PITCH_WEIGHT
            + scores.conversion * CONVERSION_WEIGHT
            + scores.rapport * RAPPORT_WEIGHT
            + scores.objection * OBJECTION_WEIGHT
            + scores.closing * CLOSING_WEIGHT,
    )
}
