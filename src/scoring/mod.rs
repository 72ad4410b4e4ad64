//! Provable Value Contribution scoring
//!
//! A pure, synchronous function from a [`MetricsRecord`] to a [`Score`].
//!
//! ## Pipeline
//!
//! ```text
//! MetricsRecord ──► cards (9) ──► tenure vector ─┐
//!        │                 └──► identity pillar ─┤
//!        ├──────────────────► capital pillar ────┼──► weighted raw
//!        └──────────────────► diversity pillar ──┘        │
//!                                                         ▼
//!                         sybil multiplier × decay ──► total (0-1000) ──► tier
//! ```
//!
//! The engine owns no state; it is safe to call from any number of tasks
//! concurrently.

mod cards;
mod engine;
mod metrics;
mod multipliers;
mod pillars;
mod tier;

pub use cards::{
    CardScores, badge_card, builder_card, competition_card, creator_card, early_adopter_card,
    minting_breadth_card, social_rank_card, tenure_card, timeliness_card,
};
pub use engine::{
    MAX_TOTAL_SCORE, PillarScores, Score, ScoreBreakdown, ScoreWeights, VectorBreakdown, WEIGHTS,
    calculate_score, normalize_score,
};
pub use metrics::{
    CapitalTier, CompetitionPlacement, EarlyAdopterVintage, MetricsRecord, non_negative,
};
pub use multipliers::{DecayInfo, decay_multiplier, sybil_multiplier};
pub use pillars::{
    CAPITAL_PILLAR_MAX, DIVERSITY_PILLAR_MAX, IDENTITY_PILLAR_MAX, Pillars, capital_pillar,
    diversity_pillar, identity_pillar, tenure_vector,
};
pub use tier::Tier;
