//! Mint indexer source
//!
//! The indexer serves two endpoints: a per-account mint-event list and a
//! reputation summary that only carries counts. The primary marketplace
//! source reads the former, the fallback the latter.

use async_trait::async_trait;
use serde::Deserialize;

use super::http::ProviderHttpClient;
use super::{MarketplaceSource, SourceError};
use crate::collector::{MarketplaceData, MintCounts, MintEvent};
use crate::registry::normalize_address;

/// Which indexer endpoint a source reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerEndpoint {
    /// `/api/mints/{address}`
    MintEvents,
    /// `/api/reputation/{address}`
    ReputationSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintsResponse {
    #[serde(default)]
    mints: Vec<RawMint>,
    #[serde(default, rename = "secondaryVolumeUSD")]
    secondary_volume_usd: f64,
    #[serde(default, rename = "creatorVolumeUSD")]
    creator_volume_usd: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMint {
    token_id: String,
    collection_address: String,
    mint_timestamp: i64,
    #[serde(default)]
    still_held: bool,
    collection_launch_timestamp: i64,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    breakdown: SummaryBreakdown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryBreakdown {
    #[serde(default)]
    zora_mints: ZoraMintSummary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoraMintSummary {
    #[serde(default)]
    early_mints: u32,
    #[serde(default)]
    unique_collections: u32,
}

pub struct IndexerSource {
    name: String,
    base_url: Option<String>,
    endpoint: IndexerEndpoint,
    http: ProviderHttpClient,
}

impl IndexerSource {
    /// `base_url` of `None` makes every fetch fail with `NotConfigured`
    pub fn new(
        name: impl Into<String>,
        base_url: Option<String>,
        endpoint: IndexerEndpoint,
        http: ProviderHttpClient,
    ) -> Self {
        Self {
            name: name.into(),
            base_url,
            endpoint,
            http,
        }
    }
}

#[async_trait]
impl MarketplaceSource for IndexerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_marketplace(&self, address: &str) -> Result<MarketplaceData, SourceError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(SourceError::NotConfigured("mint indexer"))?;
        let address = normalize_address(address);

        match self.endpoint {
            IndexerEndpoint::MintEvents => {
                let url = self
                    .http
                    .endpoint(base, &format!("api/mints/{}", address), &[])?;
                let response: Option<MintsResponse> =
                    self.http.get_json_optional(url, &[]).await?;
                Ok(from_mints(response.unwrap_or_default()))
            }
            IndexerEndpoint::ReputationSummary => {
                let url = self
                    .http
                    .endpoint(base, &format!("api/reputation/{}", address), &[])?;
                let response: Option<SummaryResponse> =
                    self.http.get_json_optional(url, &[]).await?;
                Ok(from_summary(response.unwrap_or_default()))
            }
        }
    }
}

fn from_mints(response: MintsResponse) -> MarketplaceData {
    MarketplaceData {
        mints: response
            .mints
            .into_iter()
            .map(|m| MintEvent {
                token_id: m.token_id,
                collection_address: normalize_address(&m.collection_address),
                mint_timestamp: m.mint_timestamp,
                still_held: m.still_held,
                collection_launch_timestamp: m.collection_launch_timestamp,
            })
            .collect(),
        counts: None,
        secondary_volume_usd: response.secondary_volume_usd,
        creator_volume_usd: response.creator_volume_usd,
    }
}

fn from_summary(response: SummaryResponse) -> MarketplaceData {
    let zora = response.breakdown.zora_mints;
    MarketplaceData {
        counts: Some(MintCounts {
            unique_collections: zora.unique_collections,
            held_early_mints: zora.early_mints,
        }),
        ..Default::default()
    }
}
