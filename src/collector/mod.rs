//! Metrics Collector
//!
//! ## Collection flow
//!
//! ```text
//!                      ┌─ on-chain ────┐
//!                      ├─ marketplace ─┤   per domain:
//! collect_metrics ─────┼─ social ──────┼── override? ─► cache? ─► primary ─► fallback ─► empty
//!   (tokio::join!)     └─ identity ────┘
//!                              │
//!                              ▼
//!                aggregate (registry, chain params, now) ──► MetricsRecord
//! ```
//!
//! No error escapes collection: a domain whose sources both fail yields its
//! empty record, which is cached with the degraded TTL.

mod aggregator;
mod cache;
mod fallback;
mod marketplace;
mod onchain;
mod types;

pub use aggregator::{
    CollectionOverrides, CollectorSettings, CollectorSources, DomainCaches, MetricsCollector,
    SourcePair, aggregate,
};
pub use cache::{DEFAULT_MAX_ENTRIES, InMemoryCache, MetricsCache};
pub use fallback::with_fallback;
pub use marketplace::{EARLY_MINT_HOLD_DAYS, EARLY_MINT_WINDOW_DAYS, is_early_mint, mint_counts};
pub use onchain::{
    ChainParams, LiquidityMetrics, OnChainSummary, ProtocolMetrics, active_months,
    consecutive_streak, days_active, days_since, early_adopter_vintage, gas_used_eth,
    liquidity_metrics, protocol_metrics, volume_usd, wallet_age_months,
};
pub use types::{
    ContractInteraction, DeployedContract, IdentityData, MarketplaceData, MintCounts, MintEvent,
    OnChainData, SocialData, Transaction,
};
