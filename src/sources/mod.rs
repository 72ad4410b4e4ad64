//! Data providers for the four collection domains
//!
//! ## Providers
//!
//! ```text
//! ┌─────────────┬──────────────────────────┬─────────────────────────────┐
//! │ Domain      │ Primary                  │ Fallback                    │
//! ├─────────────┼──────────────────────────┼─────────────────────────────┤
//! │ on-chain    │ BaseScan txlist          │ Blockscout txlist           │
//! │ marketplace │ indexer mint events      │ indexer reputation summary  │
//! │ social      │ Farcaster hub + OpenRank │ secondary Farcaster hub     │
//! │ identity    │ EAS GraphQL + passport   │ secondary EAS GraphQL       │
//! └─────────────┴──────────────────────────┴─────────────────────────────┘
//! ```
//!
//! Every provider implements one of the domain traits below, so the
//! collector can be wired to HTTP providers in production and to stubs in
//! tests.

pub mod attestation;
pub mod explorer;
pub mod farcaster;
pub mod http;
pub mod indexer;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::collector::{
    CollectorSources, IdentityData, MarketplaceData, OnChainData, SocialData, SourcePair,
};
use crate::config::ScoringConfig;
use crate::registry::ProtocolRegistry;

pub use attestation::{AttestationSource, PassportClient};
pub use explorer::ExplorerSource;
pub use farcaster::{FarcasterHubSource, OpenRankClient};
pub use http::ProviderHttpClient;
pub use indexer::{IndexerEndpoint, IndexerSource};

/// Failure of a single provider call
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("response too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: usize },
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

#[async_trait]
pub trait OnChainSource: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    async fn fetch_transactions(&self, address: &str) -> Result<OnChainData, SourceError>;
}

#[async_trait]
pub trait MarketplaceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_marketplace(&self, address: &str) -> Result<MarketplaceData, SourceError>;
}

#[async_trait]
pub trait SocialSource: Send + Sync {
    fn name(&self) -> &str;

    /// An address with no social account is a successful empty record, not an error
    async fn fetch_social(&self, address: &str) -> Result<SocialData, SourceError>;
}

#[async_trait]
pub trait IdentitySource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_identity(&self, address: &str) -> Result<IdentityData, SourceError>;
}

/// Build the HTTP providers for every domain from configuration
pub fn http_sources(
    config: &ScoringConfig,
    registry: Arc<ProtocolRegistry>,
) -> anyhow::Result<CollectorSources> {
    let p = &config.providers;
    let t = &config.timeouts;
    let security = &config.security;

    let onchain_http = ProviderHttpClient::new(security, t.onchain())?;
    let marketplace_http = ProviderHttpClient::new(security, t.marketplace())?;
    let social_http = ProviderHttpClient::new(security, t.social())?;
    let identity_http = ProviderHttpClient::new(security, t.identity())?;

    let onchain = SourcePair::<dyn OnChainSource>::new(
        Arc::new(ExplorerSource::new(
            "basescan",
            p.basescan_url.clone(),
            p.basescan_api_key.clone(),
            config.chain.max_transactions,
            onchain_http.clone(),
            Arc::clone(&registry),
        )),
        Arc::new(ExplorerSource::new(
            "blockscout",
            p.blockscout_url.clone(),
            p.blockscout_api_key.clone(),
            config.chain.max_transactions,
            onchain_http,
            registry,
        )),
    );

    let marketplace = SourcePair::<dyn MarketplaceSource>::new(
        Arc::new(IndexerSource::new(
            "indexer-mints",
            p.indexer_url.clone(),
            IndexerEndpoint::MintEvents,
            marketplace_http.clone(),
        )),
        Arc::new(IndexerSource::new(
            "indexer-summary",
            p.indexer_url.clone(),
            IndexerEndpoint::ReputationSummary,
            marketplace_http,
        )),
    );

    let ranking = match &p.openrank_url {
        Some(url) => Some(OpenRankClient::new(
            url.clone(),
            p.openrank_population,
            t.ranking(),
            ProviderHttpClient::new(security, t.ranking())?,
        )),
        None => None,
    };
    let social = SourcePair::<dyn SocialSource>::new(
        Arc::new(FarcasterHubSource::new(
            "farcaster-hub",
            p.farcaster_hub_url.clone(),
            social_http.clone(),
            ranking,
        )),
        Arc::new(FarcasterHubSource::new(
            "farcaster-fallback-hub",
            p.farcaster_fallback_hub_url.clone(),
            social_http,
            None,
        )),
    );

    let passport = |http: ProviderHttpClient| {
        p.passport_api_key
            .clone()
            .map(|key| PassportClient::new(p.passport_url.clone(), key, http))
    };
    let identity = SourcePair::<dyn IdentitySource>::new(
        Arc::new(AttestationSource::new(
            "eas-base",
            p.eas_graphql_url.clone(),
            p.eas_schema_id.clone(),
            identity_http.clone(),
            passport(identity_http.clone()),
        )),
        Arc::new(AttestationSource::new(
            "eas-fallback",
            p.eas_fallback_graphql_url.clone(),
            p.eas_schema_id.clone(),
            identity_http.clone(),
            passport(identity_http),
        )),
    );

    info!(
        "Provider sources ready (indexer: {}, ranking: {}, passport: {})",
        p.indexer_url.is_some(),
        p.openrank_url.is_some(),
        p.passport_api_key.is_some(),
    );

    Ok(CollectorSources {
        onchain,
        marketplace,
        social,
        identity,
    })
}
