//! Tenure vector and the three weighted pillars
//!
//! Capital rewards commitment rather than raw volume (logarithmic gas,
//! bucketed capital), Diversity rewards breadth across protocols, and
//! Identity rewards hard-to-fake social and attestation signals.

use serde::{Deserialize, Serialize};

use super::cards::CardScores;
use super::metrics::{CapitalTier, MetricsRecord};

pub const CAPITAL_PILLAR_MAX: f64 = 400.0;
pub const DIVERSITY_PILLAR_MAX: f64 = 300.0;
pub const IDENTITY_PILLAR_MAX: f64 = 300.0;

/// Streak bonus per consecutive active month
const STREAK_BONUS_PER_MONTH: f64 = 0.05;
const STREAK_BONUS_CAP: f64 = 1.5;

/// Unrounded pillar values, each already clamped to its cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pillars {
    pub capital: f64,
    pub diversity: f64,
    pub identity: f64,
}

impl Pillars {
    pub fn from_metrics(metrics: &MetricsRecord, cards: &CardScores) -> Self {
        Self {
            capital: capital_pillar(metrics),
            diversity: diversity_pillar(metrics),
            identity: identity_pillar(metrics, cards),
        }
    }
}

/// Tenure card scaled by the consecutive-month streak bonus (up to +50%)
pub fn tenure_vector(tenure_card: u32, consecutive_streak: u32) -> f64 {
    let bonus = (1.0 + f64::from(consecutive_streak) * STREAK_BONUS_PER_MONTH).min(STREAK_BONUS_CAP);
    f64::from(tenure_card) * bonus
}

/// Liquidity held under a week earns nothing; a month or more earns 1.5x
pub fn liquidity_score(duration_days: u32) -> f64 {
    if duration_days < 7 {
        return 0.0;
    }
    let base = (f64::from(duration_days) * 2.0).min(150.0);
    if duration_days >= 30 { base * 1.5 } else { base }
}

pub fn lending_score(utilization: f64) -> f64 {
    clamp_score(utilization * 10.0, 100.0)
}

pub fn capital_tier_bonus(tier: CapitalTier) -> f64 {
    match tier {
        CapitalTier::High => 300.0,
        CapitalTier::Mid => 150.0,
        CapitalTier::Low => 50.0,
    }
}

/// `min(100, 100 * log10(1 + gas))`
pub fn gas_score(gas_used_eth: f64) -> f64 {
    clamp_score(100.0 * (1.0 + gas_used_eth).log10(), 100.0)
}

/// Pillar 1: capital efficiency & commitment, max 400
pub fn capital_pillar(metrics: &MetricsRecord) -> f64 {
    let score = liquidity_score(metrics.liquidity_duration_days)
        + lending_score(metrics.lending_utilization)
        + capital_tier_bonus(metrics.capital_tier)
        + gas_score(metrics.gas_used_eth);
    clamp_score(score, CAPITAL_PILLAR_MAX)
}

/// Pillar 2: ecosystem diversity, max 300
pub fn diversity_pillar(metrics: &MetricsRecord) -> f64 {
    let protocols = (f64::from(metrics.unique_protocols) * 10.0).min(200.0);
    let vintage = (f64::from(metrics.vintage_contracts) * 5.0).min(50.0);
    let categories = (metrics.protocol_categories.len() as f64 * 10.0).min(50.0);
    clamp_score(protocols + vintage + categories, DIVERSITY_PILLAR_MAX)
}

/// Pillar 3: identity & social proof, max 300.
///
/// The wallet-age adjustment applies to the social part accumulated so far:
/// a year or more adds 50, under three months halves it.
pub fn identity_pillar(metrics: &MetricsRecord, cards: &CardScores) -> f64 {
    let mut score = 0.0;

    if metrics.social_id.is_some() {
        score += 50.0;
    }

    score += match metrics.social_percentile {
        Some(p) if p >= 90.0 => 100.0,
        Some(p) if p >= 80.0 => 75.0,
        Some(p) if p >= 50.0 => 50.0,
        _ => 0.0,
    };

    if metrics.wallet_age_months >= 12 {
        score += 50.0;
    } else if metrics.wallet_age_months < 3 {
        score *= 0.5;
    }

    if metrics.has_verified_attestation {
        score += 50.0;
    }

    score += f64::from(cards.creator) * 0.3;

    clamp_score(score, IDENTITY_PILLAR_MAX)
}

/// Clamp into `[0, max]`, NaN to 0
fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
