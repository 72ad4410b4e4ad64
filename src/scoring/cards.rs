//! Card scores
//!
//! Each card turns one discrete signal into a bounded point value. Cards are
//! shown to the user and feed the tenure vector and identity pillar; they are
//! never summed into the total directly.

use serde::{Deserialize, Serialize};

use super::metrics::{CompetitionPlacement, EarlyAdopterVintage, MetricsRecord};

pub const TENURE_CARD_MAX: u32 = 365;
pub const MINTING_CARD_MAX: u32 = 500;
pub const TIMELINESS_CARD_MAX: u32 = 500;

/// The nine card scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardScores {
    /// 0-365
    pub tenure: u32,
    /// 0-500
    pub minting_breadth: u32,
    /// 0-500
    pub timeliness: u32,
    /// 0-1000
    pub social_rank: u32,
    /// 0-400
    pub early_adopter: u32,
    /// 0-1000
    pub builder: u32,
    /// 0-1000
    pub creator: u32,
    /// 0-500
    pub badge_completion: u32,
    /// 0-500
    pub competition: u32,
}

impl CardScores {
    pub fn from_metrics(metrics: &MetricsRecord) -> Self {
        Self {
            tenure: tenure_card(metrics.active_months),
            minting_breadth: minting_breadth_card(metrics.unique_collections),
            timeliness: timeliness_card(metrics.held_early_mints),
            social_rank: social_rank_card(metrics.social_percentile),
            early_adopter: early_adopter_card(metrics.early_adopter_vintage),
            builder: builder_card(metrics.gas_induced_eth),
            creator: creator_card(metrics.secondary_market_volume_usd),
            badge_completion: badge_card(metrics.badges),
            competition: competition_card(metrics.competition_placement),
        }
    }
}

/// `min(365, floor(100 * log2(active_months + 1)))`
pub fn tenure_card(active_months: u32) -> u32 {
    if active_months == 0 {
        return 0;
    }
    let score = (100.0 * (f64::from(active_months) + 1.0).log2()).floor();
    (score as u32).min(TENURE_CARD_MAX)
}

/// 20 points per distinct collection
pub fn minting_breadth_card(unique_collections: u32) -> u32 {
    unique_collections.saturating_mul(20).min(MINTING_CARD_MAX)
}

/// 50 points per early mint still held
pub fn timeliness_card(held_early_mints: u32) -> u32 {
    held_early_mints.saturating_mul(50).min(TIMELINESS_CARD_MAX)
}

pub fn social_rank_card(percentile: Option<f64>) -> u32 {
    match percentile {
        Some(p) if p >= 99.0 => 1000,
        Some(p) if p >= 95.0 => 750,
        Some(p) if p >= 90.0 => 500,
        Some(p) if p >= 75.0 => 200,
        _ => 0,
    }
}

pub fn early_adopter_card(vintage: EarlyAdopterVintage) -> u32 {
    match vintage {
        EarlyAdopterVintage::Genesis => 400,
        EarlyAdopterVintage::Month1 => 200,
        EarlyAdopterVintage::None => 0,
    }
}

/// Gas other accounts spent on contracts this account deployed
pub fn builder_card(gas_induced_eth: f64) -> u32 {
    if gas_induced_eth.is_nan() || gas_induced_eth < 0.1 {
        0
    } else if gas_induced_eth < 1.0 {
        200
    } else if gas_induced_eth < 10.0 {
        600
    } else {
        1000
    }
}

pub fn creator_card(secondary_volume_usd: f64) -> u32 {
    if secondary_volume_usd.is_nan() || secondary_volume_usd < 100.0 {
        0
    } else if secondary_volume_usd < 1_000.0 {
        250
    } else if secondary_volume_usd < 10_000.0 {
        600
    } else {
        1000
    }
}

pub fn badge_card(badges: u32) -> u32 {
    match badges {
        16.. => 500,
        6.. => 300,
        1.. => 100,
        0 => 0,
    }
}

pub fn competition_card(placement: Option<CompetitionPlacement>) -> u32 {
    match placement {
        Some(CompetitionPlacement::Winner) => 500,
        Some(CompetitionPlacement::Finalist) => 300,
        Some(CompetitionPlacement::Submission) => 100,
        None => 0,
    }
}
