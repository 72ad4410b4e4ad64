//! Flat metrics record consumed by the scoring engine

use serde::{Deserialize, Serialize};

/// Volume bucket of an account's on-chain capital
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapitalTier {
    #[default]
    Low,
    Mid,
    High,
}

impl CapitalTier {
    pub const MID_THRESHOLD_USD: f64 = 10_000.0;
    pub const HIGH_THRESHOLD_USD: f64 = 100_000.0;

    pub fn from_volume_usd(volume_usd: f64) -> Self {
        if volume_usd >= Self::HIGH_THRESHOLD_USD {
            CapitalTier::High
        } else if volume_usd >= Self::MID_THRESHOLD_USD {
            CapitalTier::Mid
        } else {
            CapitalTier::Low
        }
    }
}

/// When the account first appeared relative to network launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarlyAdopterVintage {
    Genesis,
    Month1,
    #[default]
    None,
}

/// Best placement in a hackathon-style competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionPlacement {
    Submission,
    Finalist,
    Winner,
}

/// All per-account facts the engine needs, for one evaluation time.
///
/// Counts are unsigned; floating fields are expected to be finite and
/// non-negative and are re-sanitized by [`MetricsRecord::sanitized`] on entry
/// to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    // Tenure & activity
    pub active_months: u32,
    pub consecutive_streak: u32,
    pub wallet_age_months: u32,
    pub days_active: u32,
    #[serde(rename = "gasUsedETH")]
    pub gas_used_eth: f64,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
    pub unique_contracts: u32,
    #[serde(rename = "gasInducedETH")]
    pub gas_induced_eth: f64,
    /// Unix seconds of the latest transaction, 0 when none
    pub last_active_timestamp: i64,
    pub days_since_last_activity: u32,

    // Capital & diversity
    pub liquidity_duration_days: u32,
    pub liquidity_positions: u32,
    pub lending_utilization: f64,
    pub capital_tier: CapitalTier,
    pub unique_protocols: u32,
    pub vintage_contracts: u32,
    pub protocol_categories: Vec<String>,

    // Creator & social
    pub unique_collections: u32,
    pub held_early_mints: u32,
    #[serde(rename = "secondaryMarketVolumeUSD")]
    pub secondary_market_volume_usd: f64,
    #[serde(rename = "creatorVolumeUSD")]
    pub creator_volume_usd: f64,
    pub social_percentile: Option<f64>,
    pub social_rank: Option<u64>,
    pub social_id: Option<u64>,
    pub followers: u32,
    pub following: u32,
    pub casts: u32,

    // Identity
    pub has_verified_attestation: bool,
    pub passport_score: Option<f64>,

    // Achievements
    pub badges: u32,
    pub competition_placement: Option<CompetitionPlacement>,
    pub early_adopter_vintage: EarlyAdopterVintage,
}

impl MetricsRecord {
    /// Copy with every floating field non-negative.
    ///
    /// NaN and negatives become 0 (or `None` for optional fields); positive
    /// infinity is kept because every formula caps it.
    pub fn sanitized(&self) -> Self {
        let mut clean = self.clone();
        clean.gas_used_eth = non_negative(self.gas_used_eth);
        clean.volume_usd = non_negative(self.volume_usd);
        clean.gas_induced_eth = non_negative(self.gas_induced_eth);
        clean.lending_utilization = non_negative(self.lending_utilization);
        clean.secondary_market_volume_usd = non_negative(self.secondary_market_volume_usd);
        clean.creator_volume_usd = non_negative(self.creator_volume_usd);
        clean.social_percentile = self.social_percentile.filter(|v| *v >= 0.0);
        clean.passport_score = self.passport_score.filter(|v| *v >= 0.0);
        clean.last_active_timestamp = self.last_active_timestamp.max(0);
        clean
    }
}

/// Clamp to `[0, +inf]`, mapping NaN to 0
pub fn non_negative(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}
