//! Raw per-domain data as returned by providers and held in the caches

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::registry::{ProtocolRegistry, ProtocolTier, normalize_address};

/// One transaction of the evaluated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    /// Unix seconds
    pub timestamp: i64,
    pub gas_used: u128,
    /// Wei per gas
    pub gas_price: u128,
    /// `None` for contract creation
    pub to: Option<String>,
    /// Wei
    pub value: u128,
}

/// Aggregated interactions with one counterparty contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInteraction {
    pub contract_address: String,
    pub contract_tier: ProtocolTier,
    pub interaction_count: u32,
    pub first_interaction: i64,
    pub last_interaction: i64,
}

/// A contract created by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    /// Creation transaction hash until the receipt address is known
    pub address: String,
    pub deploy_timestamp: i64,
    /// Wei other accounts spent calling this contract
    pub total_gas_induced: u128,
}

/// On-chain domain record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainData {
    pub address: String,
    /// Unix seconds, 0 when the account has no transactions
    pub first_tx_timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub contract_interactions: Vec<ContractInteraction>,
    pub deployed_contracts: Vec<DeployedContract>,
}

impl OnChainData {
    pub fn empty(address: &str) -> Self {
        Self {
            address: normalize_address(address),
            ..Default::default()
        }
    }

    /// Build the domain record from a raw transaction list.
    ///
    /// Transactions are sorted by time; interactions are grouped by recipient
    /// (self-transfers excluded) and tiered through the registry; null
    /// recipients become deployments.
    pub fn from_transactions(
        address: &str,
        mut transactions: Vec<Transaction>,
        registry: &ProtocolRegistry,
    ) -> Self {
        let address = normalize_address(address);
        transactions.sort_by_key(|tx| tx.timestamp);

        let first_tx_timestamp = transactions.first().map(|tx| tx.timestamp).unwrap_or(0);

        let mut interactions: HashMap<String, ContractInteraction> = HashMap::new();
        let mut deployed_contracts = Vec::new();

        for tx in &transactions {
            match tx.to.as_deref().map(normalize_address) {
                Some(to) if to == address => {}
                Some(to) => {
                    interactions
                        .entry(to.clone())
                        .and_modify(|i| {
                            i.interaction_count = i.interaction_count.saturating_add(1);
                            i.first_interaction = i.first_interaction.min(tx.timestamp);
                            i.last_interaction = i.last_interaction.max(tx.timestamp);
                        })
                        .or_insert_with(|| ContractInteraction {
                            contract_tier: registry.tier_of(&to),
                            contract_address: to,
                            interaction_count: 1,
                            first_interaction: tx.timestamp,
                            last_interaction: tx.timestamp,
                        });
                }
                None => deployed_contracts.push(DeployedContract {
                    address: tx.hash.clone(),
                    deploy_timestamp: tx.timestamp,
                    total_gas_induced: 0,
                }),
            }
        }

        let mut contract_interactions: Vec<_> = interactions.into_values().collect();
        contract_interactions.sort_by(|a, b| a.contract_address.cmp(&b.contract_address));

        Self {
            address,
            first_tx_timestamp,
            transactions,
            contract_interactions,
            deployed_contracts,
        }
    }
}

/// One NFT mint received by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    pub token_id: String,
    pub collection_address: String,
    /// Unix seconds
    pub mint_timestamp: i64,
    pub still_held: bool,
    /// Unix seconds
    pub collection_launch_timestamp: i64,
}

/// Pre-aggregated counts for providers that cannot list individual mints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintCounts {
    pub unique_collections: u32,
    pub held_early_mints: u32,
}

/// Marketplace domain record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceData {
    pub mints: Vec<MintEvent>,
    /// Set when the provider only reports counts; takes precedence over `mints`
    pub counts: Option<MintCounts>,
    pub secondary_volume_usd: f64,
    pub creator_volume_usd: f64,
}

/// Social-graph domain record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialData {
    pub percentile: Option<f64>,
    pub rank: Option<u64>,
    pub social_id: Option<u64>,
    pub followers: u32,
    pub following: u32,
    pub casts: u32,
}

/// Identity domain record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityData {
    pub has_verified_attestation: bool,
    pub passport_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, timestamp: i64, to: Option<&str>) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            timestamp,
            gas_used: 21_000,
            gas_price: 1_000_000_000,
            to: to.map(str::to_string),
            value: 0,
        }
    }

    #[test]
    fn test_from_transactions_groups_interactions() {
        let registry = ProtocolRegistry::base_mainnet();
        let uniswap = "0x4752BA5DBC23F44D87826276BF6FD6B1C372AD24";
        let data = OnChainData::from_transactions(
            "0xABC",
            vec![
                tx("0x3", 300, Some(uniswap)),
                tx("0x1", 100, Some(uniswap)),
                tx("0x2", 200, Some("0xdead")),
                tx("0x4", 400, None),
                tx("0x5", 500, Some("0xabc")),
            ],
            &registry,
        );

        assert_eq!(data.address, "0xabc");
        assert_eq!(data.first_tx_timestamp, 100);
        assert_eq!(data.transactions[0].hash, "0x1");
        assert_eq!(data.contract_interactions.len(), 2);
        assert_eq!(data.deployed_contracts.len(), 1);
        assert_eq!(data.deployed_contracts[0].address, "0x4");

        let uni = data
            .contract_interactions
            .iter()
            .find(|i| i.contract_address == uniswap.to_lowercase())
            .unwrap();
        assert_eq!(uni.interaction_count, 2);
        assert_eq!(uni.first_interaction, 100);
        assert_eq!(uni.last_interaction, 300);
        assert_eq!(uni.contract_tier, ProtocolTier::Tier1);

        let unknown = data
            .contract_interactions
            .iter()
            .find(|i| i.contract_address == "0xdead")
            .unwrap();
        assert_eq!(unknown.contract_tier, ProtocolTier::Tier3);
    }

    #[test]
    fn test_empty_record() {
        let data = OnChainData::from_transactions("0xAbC", Vec::new(), &ProtocolRegistry::default());
        assert_eq!(data, OnChainData::empty("0xabc"));
    }
}
