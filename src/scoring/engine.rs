//! Score assembly
//!
//! `raw = 0.20 T + 0.40 Capital + 0.15 Diversity + 0.15 Identity`
//! `total = min(1000, floor(raw * sybil * decay))`

use serde::{Deserialize, Serialize};

use super::cards::{CardScores, TENURE_CARD_MAX};
use super::metrics::MetricsRecord;
use super::multipliers::{DecayInfo, sybil_multiplier};
use super::pillars::{
    CAPITAL_PILLAR_MAX, DIVERSITY_PILLAR_MAX, IDENTITY_PILLAR_MAX, Pillars, tenure_vector,
};
use super::tier::Tier;

pub const MAX_TOTAL_SCORE: u32 = 1000;

/// Weight of each vector in the raw score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub tenure: f64,
    pub capital: f64,
    pub diversity: f64,
    pub identity: f64,
}

pub const WEIGHTS: ScoreWeights = ScoreWeights {
    tenure: 0.20,
    capital: 0.40,
    diversity: 0.15,
    identity: 0.15,
};

/// Floored pillar values for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarScores {
    /// 0-400
    pub capital: u32,
    /// 0-300
    pub diversity: u32,
    /// 0-300
    pub identity: u32,
}

/// Complete scoring result for one metrics record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// 0-1000
    pub total: u32,
    pub cards: CardScores,
    pub pillars: PillarScores,
    /// Tenure card after the streak bonus, floored
    pub tenure_vector: u32,
    /// 1.0-1.7
    pub sybil_multiplier: f64,
    /// Sybil multiplier times decay multiplier
    pub multiplier: f64,
    pub tier: Tier,
    pub decay: DecayInfo,
}

/// Compute the score for a metrics record.
///
/// Pure and total: every input, including NaN or negative floats, yields a
/// well-formed score within bounds.
pub fn calculate_score(metrics: &MetricsRecord) -> Score {
    let metrics = metrics.sanitized();

    let cards = CardScores::from_metrics(&metrics);
    let tenure = tenure_vector(cards.tenure, metrics.consecutive_streak);
    let pillars = Pillars::from_metrics(&metrics, &cards);

    let sybil = sybil_multiplier(&metrics);
    let decay = DecayInfo::from_days(metrics.days_since_last_activity);

    let raw = WEIGHTS.tenure * tenure
        + WEIGHTS.capital * pillars.capital
        + WEIGHTS.diversity * pillars.diversity
        + WEIGHTS.identity * pillars.identity;

    let total = floor_to_u32(raw * sybil * decay.decay_multiplier).min(MAX_TOTAL_SCORE);

    Score {
        total,
        cards,
        pillars: PillarScores {
            capital: floor_to_u32(pillars.capital),
            diversity: floor_to_u32(pillars.diversity),
            identity: floor_to_u32(pillars.identity),
        },
        tenure_vector: floor_to_u32(tenure),
        sybil_multiplier: sybil,
        multiplier: sybil * decay.decay_multiplier,
        tier: Tier::from_total(total),
        decay,
    }
}

/// Percentage of the maximum total, 0-100
pub fn normalize_score(total: u32) -> u32 {
    (u64::from(total.min(MAX_TOTAL_SCORE)) * 100 / u64::from(MAX_TOTAL_SCORE)) as u32
}

/// One weighted vector as shown in a breakdown view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorBreakdown {
    pub score: u32,
    pub weight: f64,
    /// Share of the vector's own maximum, 0-100
    pub percentage: u32,
}

impl VectorBreakdown {
    fn new(score: u32, weight: f64, max: f64) -> Self {
        Self {
            score,
            weight,
            percentage: floor_to_u32(f64::from(score) / max * 100.0).min(100),
        }
    }
}

/// Display-oriented view of a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: u32,
    pub max: u32,
    pub percentage: u32,
    pub tier: Tier,
    pub points_to_next_tier: Option<u32>,
    pub multiplier: f64,
    pub tenure: VectorBreakdown,
    pub capital: VectorBreakdown,
    pub diversity: VectorBreakdown,
    pub identity: VectorBreakdown,
    pub cards: CardScores,
}

impl ScoreBreakdown {
    pub fn from_score(score: &Score) -> Self {
        // The streak bonus can push the tenure vector past the card cap.
        let tenure_max = f64::from(TENURE_CARD_MAX) * 1.5;
        Self {
            total: score.total,
            max: MAX_TOTAL_SCORE,
            percentage: normalize_score(score.total),
            tier: score.tier,
            points_to_next_tier: Tier::points_to_next(score.total),
            multiplier: score.multiplier,
            tenure: VectorBreakdown::new(score.tenure_vector, WEIGHTS.tenure, tenure_max),
            capital: VectorBreakdown::new(score.pillars.capital, WEIGHTS.capital, CAPITAL_PILLAR_MAX),
            diversity: VectorBreakdown::new(
                score.pillars.diversity,
                WEIGHTS.diversity,
                DIVERSITY_PILLAR_MAX,
            ),
            identity: VectorBreakdown::new(score.pillars.identity, WEIGHTS.identity, IDENTITY_PILLAR_MAX),
            cards: score.cards,
        }
    }
}

/// Floor a non-negative float into `u32`; NaN maps to 0, overflow saturates
fn floor_to_u32(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.floor() as u32
    }
}
