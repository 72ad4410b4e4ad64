//! Base Standard Score
//!
//! Reputation scoring core: collects per-account metrics from on-chain,
//! marketplace, social and identity providers and turns them into a bounded
//! 0-1000 score with a tier.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs          - Crate root with re-exports
//! ├── main.rs         - CLI entrypoint
//! ├── config.rs       - Configuration management
//! ├── registry.rs     - Protocol registry (address -> tier, category, launch)
//! ├── collector/      - Metrics Collector
//! │   ├── aggregator.rs  - Concurrent domain collection & aggregation
//! │   ├── cache.rs       - Per-domain TTL caches
//! │   ├── fallback.rs    - Primary/fallback with timeouts
//! │   ├── onchain.rs     - Transaction-history derivations
//! │   ├── marketplace.rs - Mint derivations
//! │   └── types.rs       - Domain records
//! ├── sources/        - Provider clients
//! │   ├── http.rs        - Validating JSON HTTP client
//! │   ├── explorer.rs    - BaseScan / Blockscout
//! │   ├── indexer.rs     - Mint indexer
//! │   ├── farcaster.rs   - Farcaster hub + OpenRank
//! │   └── attestation.rs - EAS + passport
//! └── scoring/        - Scoring Engine (pure)
//!     ├── cards.rs       - Nine achievement cards
//!     ├── pillars.rs     - Capital / Diversity / Identity
//!     ├── multipliers.rs - Sybil & decay
//!     ├── tier.rs        - Tiers
//!     └── engine.rs      - Final assembly & breakdown
//! ```

pub mod collector;
pub mod config;
pub mod registry;
pub mod scoring;
pub mod sources;

// Re-export main types for convenience
pub use collector::{
    ChainParams, CollectionOverrides, CollectorSettings, CollectorSources, DomainCaches,
    IdentityData, InMemoryCache, MarketplaceData, MetricsCache, MetricsCollector, OnChainData,
    SocialData, SourcePair,
};
pub use config::ScoringConfig;
pub use registry::{ProtocolCategory, ProtocolEntry, ProtocolRegistry, ProtocolTier};
pub use scoring::{MetricsRecord, Score, ScoreBreakdown, Tier, calculate_score, normalize_score};
pub use sources::{IdentitySource, MarketplaceSource, OnChainSource, SocialSource, SourceError};
