//! Deterministic derivations from the on-chain domain record
//!
//! All calendar math is UTC. `now` is always passed in so results are
//! reproducible for a fixed evaluation time.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::types::{ContractInteraction, OnChainData, Transaction};
use crate::registry::{ProtocolCategory, ProtocolRegistry, VINTAGE_AGE_DAYS};
use crate::scoring::{CapitalTier, EarlyAdopterVintage};

pub const WEI_PER_ETH: f64 = 1e18;
pub const SECONDS_PER_DAY: i64 = 86_400;
/// Wallet age is counted in 30-day months
const WALLET_MONTH_SECONDS: i64 = 30 * SECONDS_PER_DAY;
/// Accounts first seen within this many days after launch are month-1 adopters
const MONTH1_WINDOW_DAYS: i64 = 30;

/// Chain-level constants used by the derivations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainParams {
    pub eth_usd_price: f64,
    /// Unix seconds of network launch
    pub network_launch_timestamp: i64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            eth_usd_price: 2_500.0,
            // Base mainnet, 2023-08-09 00:00:00 UTC
            network_launch_timestamp: 1_691_539_200,
        }
    }
}

/// Registry-derived diversity facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMetrics {
    pub unique_protocols: u32,
    pub vintage_contracts: u32,
    pub categories: Vec<String>,
}

/// Registry-derived liquidity and lending facts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    pub duration_days: u32,
    pub positions: u32,
    pub lending_utilization: f64,
}

/// Every on-chain field of the metrics record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnChainSummary {
    pub active_months: u32,
    pub consecutive_streak: u32,
    pub wallet_age_months: u32,
    pub days_active: u32,
    pub gas_used_eth: f64,
    pub volume_usd: f64,
    pub unique_contracts: u32,
    pub gas_induced_eth: f64,
    pub capital_tier: CapitalTier,
    pub early_adopter_vintage: EarlyAdopterVintage,
    pub last_active_timestamp: i64,
    pub days_since_last_activity: u32,
    pub protocols: ProtocolMetrics,
    pub liquidity: LiquidityMetrics,
}

impl OnChainSummary {
    pub fn derive(
        data: &OnChainData,
        registry: &ProtocolRegistry,
        params: &ChainParams,
        now: DateTime<Utc>,
    ) -> Self {
        let txs = &data.transactions;
        let volume_usd = volume_usd(txs, params.eth_usd_price);
        let last_active_timestamp = txs.iter().map(|tx| tx.timestamp).max().unwrap_or(0);

        Self {
            active_months: active_months(txs),
            consecutive_streak: consecutive_streak(txs),
            wallet_age_months: wallet_age_months(data.first_tx_timestamp, now),
            days_active: days_active(txs),
            gas_used_eth: gas_used_eth(txs),
            volume_usd,
            unique_contracts: count(
                data.contract_interactions
                    .iter()
                    .map(|i| i.contract_address.as_str())
                    .collect::<HashSet<_>>()
                    .len(),
            ),
            gas_induced_eth: wei_to_eth(
                data.deployed_contracts
                    .iter()
                    .fold(0u128, |sum, c| sum.saturating_add(c.total_gas_induced)),
            ),
            capital_tier: CapitalTier::from_volume_usd(volume_usd),
            early_adopter_vintage: early_adopter_vintage(
                data.first_tx_timestamp,
                params.network_launch_timestamp,
            ),
            last_active_timestamp,
            days_since_last_activity: days_since(last_active_timestamp, now),
            protocols: protocol_metrics(&data.contract_interactions, registry, now),
            liquidity: liquidity_metrics(&data.contract_interactions, registry),
        }
    }
}

/// Months since epoch for a timestamp, `None` when out of range
fn month_index(timestamp: i64) -> Option<i64> {
    let date = Utc.timestamp_opt(timestamp, 0).single()?;
    Some(i64::from(date.year()) * 12 + i64::from(date.month0()))
}

fn day_of(timestamp: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(timestamp, 0).single().map(|d| d.date_naive())
}

/// Distinct calendar months with at least one transaction
pub fn active_months(transactions: &[Transaction]) -> u32 {
    count(
        transactions
            .iter()
            .filter_map(|tx| month_index(tx.timestamp))
            .collect::<HashSet<_>>()
            .len(),
    )
}

/// Longest run of consecutive active calendar months
pub fn consecutive_streak(transactions: &[Transaction]) -> u32 {
    let months: BTreeSet<i64> = transactions
        .iter()
        .filter_map(|tx| month_index(tx.timestamp))
        .collect();

    let mut longest = 0u32;
    let mut current = 0u32;
    let mut previous: Option<i64> = None;

    for month in months {
        current = match previous {
            Some(p) if month - p == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(month);
    }

    longest
}

/// Distinct calendar days with at least one transaction
pub fn days_active(transactions: &[Transaction]) -> u32 {
    count(
        transactions
            .iter()
            .filter_map(|tx| day_of(tx.timestamp))
            .collect::<HashSet<_>>()
            .len(),
    )
}

/// Whole 30-day months since the first transaction
pub fn wallet_age_months(first_tx_timestamp: i64, now: DateTime<Utc>) -> u32 {
    if first_tx_timestamp <= 0 {
        return 0;
    }
    let age = now.timestamp().saturating_sub(first_tx_timestamp).max(0);
    u32::try_from(age / WALLET_MONTH_SECONDS).unwrap_or(u32::MAX)
}

/// Σ(gas_used × gas_price), in ETH
pub fn gas_used_eth(transactions: &[Transaction]) -> f64 {
    wei_to_eth(transactions.iter().fold(0u128, |sum, tx| {
        sum.saturating_add(tx.gas_used.saturating_mul(tx.gas_price))
    }))
}

/// Σ(value) at a flat ETH/USD rate
pub fn volume_usd(transactions: &[Transaction], eth_usd_price: f64) -> f64 {
    let total = transactions
        .iter()
        .fold(0u128, |sum, tx| sum.saturating_add(tx.value));
    let volume = wei_to_eth(total) * eth_usd_price;
    if volume.is_finite() && volume > 0.0 { volume } else { 0.0 }
}

pub fn early_adopter_vintage(first_tx_timestamp: i64, launch_timestamp: i64) -> EarlyAdopterVintage {
    if first_tx_timestamp <= 0 {
        return EarlyAdopterVintage::None;
    }
    if first_tx_timestamp < launch_timestamp {
        EarlyAdopterVintage::Genesis
    } else if first_tx_timestamp < launch_timestamp.saturating_add(MONTH1_WINDOW_DAYS * SECONDS_PER_DAY) {
        EarlyAdopterVintage::Month1
    } else {
        EarlyAdopterVintage::None
    }
}

/// Whole days between `timestamp` and `now`; 0 without activity or for future timestamps
pub fn days_since(timestamp: i64, now: DateTime<Utc>) -> u32 {
    if timestamp <= 0 {
        return 0;
    }
    let elapsed = now.timestamp().saturating_sub(timestamp).max(0);
    u32::try_from(elapsed / SECONDS_PER_DAY).unwrap_or(u32::MAX)
}

/// Protocol diversity through the registry.
///
/// Registered contracts are grouped by protocol name; each unregistered
/// contract counts as its own protocol. Vintage status comes from the
/// registry launch date when the contract is registered, and from the
/// account's first interaction only when it is not.
pub fn protocol_metrics(
    interactions: &[ContractInteraction],
    registry: &ProtocolRegistry,
    now: DateTime<Utc>,
) -> ProtocolMetrics {
    let year_ago = (now - Duration::days(VINTAGE_AGE_DAYS)).timestamp();

    let mut protocols = HashSet::new();
    let mut categories = BTreeSet::new();
    let mut vintage = 0u32;

    for interaction in interactions {
        let address = interaction.contract_address.as_str();
        match registry.lookup(address) {
            Some(entry) => {
                protocols.insert(format!("protocol:{}", entry.name));
                if entry.category != ProtocolCategory::Other {
                    categories.insert(entry.category.to_string());
                }
                if registry.is_vintage(address, now) {
                    vintage += 1;
                }
            }
            None => {
                protocols.insert(address.to_string());
                if interaction.first_interaction > 0 && interaction.first_interaction < year_ago {
                    vintage += 1;
                }
            }
        }
    }

    ProtocolMetrics {
        unique_protocols: count(protocols.len()),
        vintage_contracts: vintage,
        categories: categories.into_iter().collect(),
    }
}

/// DEX contracts stand in for liquidity positions and lending contract
/// calls for lending utilization.
pub fn liquidity_metrics(
    interactions: &[ContractInteraction],
    registry: &ProtocolRegistry,
) -> LiquidityMetrics {
    let mut metrics = LiquidityMetrics::default();

    for interaction in interactions {
        match registry.category_of(&interaction.contract_address) {
            ProtocolCategory::Dex => {
                metrics.positions += 1;
                let span = interaction
                    .last_interaction
                    .saturating_sub(interaction.first_interaction)
                    .max(0);
                let days = u32::try_from(span / SECONDS_PER_DAY).unwrap_or(u32::MAX);
                metrics.duration_days = metrics.duration_days.max(days);
            }
            ProtocolCategory::Lending => {
                metrics.lending_utilization += f64::from(interaction.interaction_count);
            }
            _ => {}
        }
    }

    metrics
}

fn wei_to_eth(wei: u128) -> f64 {
    wei as f64 / WEI_PER_ETH
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
