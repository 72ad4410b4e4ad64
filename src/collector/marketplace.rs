//! Marketplace derivations

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::onchain::SECONDS_PER_DAY;
use super::types::{MarketplaceData, MintCounts, MintEvent};
use crate::registry::normalize_address;

/// A mint is early when it lands within this many days of the collection launch
pub const EARLY_MINT_WINDOW_DAYS: i64 = 30;
/// ...and has been held for longer than this many days
pub const EARLY_MINT_HOLD_DAYS: i64 = 30;

/// Minted inside the launch window and still held past the holding period
pub fn is_early_mint(mint: &MintEvent, now: DateTime<Utc>) -> bool {
    let window_end = mint
        .collection_launch_timestamp
        .saturating_add(EARLY_MINT_WINDOW_DAYS * SECONDS_PER_DAY);
    let in_window =
        mint.mint_timestamp >= mint.collection_launch_timestamp && mint.mint_timestamp <= window_end;
    let held_days = now.timestamp().saturating_sub(mint.mint_timestamp) / SECONDS_PER_DAY;

    in_window && mint.still_held && held_days > EARLY_MINT_HOLD_DAYS
}

/// Collection and early-mint counts; provider counts win over individual mints
pub fn mint_counts(data: &MarketplaceData, now: DateTime<Utc>) -> MintCounts {
    if let Some(counts) = data.counts {
        return counts;
    }

    let collections: HashSet<String> = data
        .mints
        .iter()
        .map(|m| normalize_address(&m.collection_address))
        .collect();
    let early = data.mints.iter().filter(|m| is_early_mint(m, now)).count();

    MintCounts {
        unique_collections: u32::try_from(collections.len()).unwrap_or(u32::MAX),
        held_early_mints: u32::try_from(early).unwrap_or(u32::MAX),
    }
}
