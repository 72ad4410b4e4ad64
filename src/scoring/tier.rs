//! Reputation tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered reputation bands, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Tourist,
    Resident,
    Builder,
    Based,
    Legend,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Tourist,
        Tier::Resident,
        Tier::Builder,
        Tier::Based,
        Tier::Legend,
    ];

    /// Classify a total, highest threshold first
    pub fn from_total(total: u32) -> Self {
        match total {
            951.. => Tier::Legend,
            851.. => Tier::Based,
            651.. => Tier::Builder,
            351.. => Tier::Resident,
            _ => Tier::Tourist,
        }
    }

    /// Lowest total that lands in this tier
    pub fn min_score(self) -> u32 {
        match self {
            Tier::Tourist => 0,
            Tier::Resident => 351,
            Tier::Builder => 651,
            Tier::Based => 851,
            Tier::Legend => 951,
        }
    }

    /// Next tier up, if any
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Tourist => Some(Tier::Resident),
            Tier::Resident => Some(Tier::Builder),
            Tier::Builder => Some(Tier::Based),
            Tier::Based => Some(Tier::Legend),
            Tier::Legend => None,
        }
    }

    /// Points still needed to reach the next tier
    pub fn points_to_next(total: u32) -> Option<u32> {
        Tier::from_total(total)
            .next()
            .map(|next| next.min_score().saturating_sub(total))
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Tourist => "Tourist",
            Tier::Resident => "Resident",
            Tier::Builder => "Builder",
            Tier::Based => "Based",
            Tier::Legend => "Legend",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
