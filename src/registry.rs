//! Protocol Registry
//!
//! Static table of known Base contracts, keyed by lower-cased address.
//! Used by the collector to tier contract interactions, group them into
//! protocols and categories, and to decide whether a contract is vintage.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Contracts launched more than this many days ago count as vintage
pub const VINTAGE_AGE_DAYS: i64 = 365;

/// Trust tier of a protocol contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolTier {
    Tier1,
    Tier2,
    #[default]
    Tier3,
}

/// Protocol category used for diversity scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolCategory {
    #[serde(rename = "DEX")]
    Dex,
    Lending,
    Bridge,
    Gaming,
    #[serde(rename = "NFT")]
    Nft,
    Social,
    Infrastructure,
    Other,
}

impl fmt::Display for ProtocolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolCategory::Dex => "DEX",
            ProtocolCategory::Lending => "Lending",
            ProtocolCategory::Bridge => "Bridge",
            ProtocolCategory::Gaming => "Gaming",
            ProtocolCategory::Nft => "NFT",
            ProtocolCategory::Social => "Social",
            ProtocolCategory::Infrastructure => "Infrastructure",
            ProtocolCategory::Other => "Other",
        };
        f.write_str(name)
    }
}

/// One registry row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolEntry {
    pub name: String,
    pub tier: ProtocolTier,
    pub category: ProtocolCategory,
    /// Deployment time, when known
    pub launched_at: Option<DateTime<Utc>>,
}

impl ProtocolEntry {
    pub fn new(
        name: impl Into<String>,
        tier: ProtocolTier,
        category: ProtocolCategory,
        launched_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            tier,
            category,
            launched_at,
        }
    }
}

// (address, name, tier, category, launch unix seconds)
#[rustfmt::skip]
const BASE_MAINNET_CONTRACTS: &[(&str, &str, ProtocolTier, ProtocolCategory, Option<i64>)] = &[
    // DEX
    ("0x4752ba5dbc23f44d87826276bf6fd6b1c372ad24", "Uniswap V3", ProtocolTier::Tier1, ProtocolCategory::Dex, Some(1_691_625_600)),
    ("0x2626664c2603336e57b271c5c0b26f4217413556", "Uniswap V3", ProtocolTier::Tier1, ProtocolCategory::Dex, Some(1_691_625_600)),
    ("0x03a520b32c04bf3beef7beb72e919cf822ed34f1", "Aerodrome", ProtocolTier::Tier1, ProtocolCategory::Dex, Some(1_693_180_800)),
    ("0xc30141b657f4216252dc59af2e7cdb9d8792e1b0", "Aerodrome", ProtocolTier::Tier1, ProtocolCategory::Dex, Some(1_693_180_800)),
    ("0x940181a94a35a4569e4529a3cdfb74e38fd98631", "Aerodrome", ProtocolTier::Tier1, ProtocolCategory::Dex, Some(1_693_180_800)),
    ("0x6bded42c6da8fbf0d2ba55b2fa120c5e0c8d7891", "SwapBased", ProtocolTier::Tier2, ProtocolCategory::Dex, None),
    // Lending
    ("0xb125e6687d4313864e53df431d5425969c15eb2f", "Aave V3", ProtocolTier::Tier1, ProtocolCategory::Lending, Some(1_692_576_000)),
    ("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "Morpho Blue", ProtocolTier::Tier1, ProtocolCategory::Lending, Some(1_717_459_200)),
    ("0x9c4ec768c28520b50867ea8bf0a5d870d48d13f9", "Compound V3", ProtocolTier::Tier1, ProtocolCategory::Lending, Some(1_691_971_200)),
    // Bridge
    ("0x4200000000000000000000000000000000000010", "Base Bridge", ProtocolTier::Tier1, ProtocolCategory::Bridge, Some(1_686_787_200)),
    ("0x3154cf16c1010e0c0420c3b1c3c3c3c3c3c3c3c3", "Stargate", ProtocolTier::Tier2, ProtocolCategory::Bridge, None),
    ("0x8731d54e9d02c286767d56ac03e8037c07e01e98", "Hop Protocol", ProtocolTier::Tier2, ProtocolCategory::Bridge, None),
    // NFT
    ("0x04e2516a2c207e84a1839755675dfd8ef6302f0a", "Zora Creator", ProtocolTier::Tier1, ProtocolCategory::Nft, Some(1_691_539_200)),
    ("0x000000000000ad05ccc4f10045630fb830b95127", "Blur", ProtocolTier::Tier2, ProtocolCategory::Nft, None),
    ("0x0000000000000000000000000000000000000001", "OpenSea", ProtocolTier::Tier2, ProtocolCategory::Nft, None),
];

/// Read-only address → protocol table
#[derive(Debug, Clone, Default)]
pub struct ProtocolRegistry {
    entries: HashMap<String, ProtocolEntry>,
}

impl ProtocolRegistry {
    /// Build a registry from explicit rows. Addresses are normalized.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ProtocolEntry)>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(address, entry)| (normalize_address(address.as_ref()), entry))
            .collect();
        Self { entries }
    }

    /// Known Base mainnet protocols
    pub fn base_mainnet() -> Self {
        Self::from_entries(BASE_MAINNET_CONTRACTS.iter().map(
            |(address, name, tier, category, launched)| {
                let launched_at = launched.and_then(|secs| Utc.timestamp_opt(secs, 0).single());
                (*address, ProtocolEntry::new(*name, *tier, *category, launched_at))
            },
        ))
    }

    /// Process-wide Base mainnet registry, built on first use and never mutated
    pub fn shared() -> Arc<ProtocolRegistry> {
        static REGISTRY: OnceLock<Arc<ProtocolRegistry>> = OnceLock::new();
        REGISTRY
            .get_or_init(|| Arc::new(ProtocolRegistry::base_mainnet()))
            .clone()
    }

    pub fn lookup(&self, address: &str) -> Option<&ProtocolEntry> {
        self.entries.get(&normalize_address(address))
    }

    pub fn is_known(&self, address: &str) -> bool {
        self.lookup(address).is_some()
    }

    /// Tier of the contract, tier3 when unmapped
    pub fn tier_of(&self, address: &str) -> ProtocolTier {
        self.lookup(address).map(|e| e.tier).unwrap_or_default()
    }

    /// Category of the contract, `Other` when unmapped
    pub fn category_of(&self, address: &str) -> ProtocolCategory {
        self.lookup(address)
            .map(|e| e.category)
            .unwrap_or(ProtocolCategory::Other)
    }

    /// True only when the registry holds an explicit launch date more than a year before `now`
    pub fn is_vintage(&self, address: &str, now: DateTime<Utc>) -> bool {
        self.lookup(address)
            .and_then(|e| e.launched_at)
            .is_some_and(|launched| launched < now - Duration::days(VINTAGE_AGE_DAYS))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lower-case and trim an address for use as a map key
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}
