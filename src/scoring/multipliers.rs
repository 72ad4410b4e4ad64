//! Sybil-resistance boost and inactivity decay

use serde::{Deserialize, Serialize};

use super::metrics::MetricsRecord;

pub const SYBIL_MULTIPLIER_MAX: f64 = 1.7;
pub const PASSPORT_SCORE_THRESHOLD: f64 = 20.0;

pub const DECAY_PERIOD_DAYS: u32 = 30;
/// 5% per elapsed period, in basis points
const DECAY_PER_PERIOD_BPS: u32 = 500;
/// Decay never removes more than half the score
const MAX_DECAY_BPS: u32 = 5_000;

/// Decay state reported alongside the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayInfo {
    pub days_since_last_activity: u32,
    pub decay_multiplier: f64,
    pub will_decay: bool,
}

impl DecayInfo {
    pub fn from_days(days_since_last_activity: u32) -> Self {
        Self {
            days_since_last_activity,
            decay_multiplier: decay_multiplier(days_since_last_activity),
            will_decay: days_since_last_activity >= DECAY_PERIOD_DAYS,
        }
    }
}

/// `1.0 + 0.5 (verified attestation) + 0.2 (passport > 20)`, capped at 1.7
pub fn sybil_multiplier(metrics: &MetricsRecord) -> f64 {
    let mut multiplier = 1.0;

    if metrics.has_verified_attestation {
        multiplier += 0.5;
    }

    if metrics
        .passport_score
        .is_some_and(|score| score > PASSPORT_SCORE_THRESHOLD)
    {
        multiplier += 0.2;
    }

    f64::min(SYBIL_MULTIPLIER_MAX, multiplier)
}

/// 1.0 while active, then 5% off per full 30-day period, floored at 0.5
pub fn decay_multiplier(days_since_last_activity: u32) -> f64 {
    if days_since_last_activity == 0 {
        return 1.0;
    }
    let periods = days_since_last_activity / DECAY_PERIOD_DAYS;
    let decay_bps = periods.saturating_mul(DECAY_PER_PERIOD_BPS).min(MAX_DECAY_BPS);
    f64::from(10_000 - decay_bps) / 10_000.0
}
