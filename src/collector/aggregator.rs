//! Metrics Collector - gathers one `MetricsRecord` from four provider domains
//!
//! Each domain is resolved independently (cache, primary, fallback,
//! degraded-empty) and the four run concurrently.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::cache::{DEFAULT_MAX_ENTRIES, InMemoryCache, MetricsCache};
use super::fallback::with_fallback;
use super::marketplace::mint_counts;
use super::onchain::{ChainParams, OnChainSummary};
use super::types::{IdentityData, MarketplaceData, OnChainData, SocialData};
use crate::config::ScoringConfig;
use crate::registry::{ProtocolRegistry, normalize_address};
use crate::scoring::{MetricsRecord, Score, calculate_score, non_negative};
use crate::sources::{
    IdentitySource, MarketplaceSource, OnChainSource, SocialSource, SourceError,
};

/// Primary and fallback provider for one domain
pub struct SourcePair<S: ?Sized> {
    pub primary: Arc<S>,
    pub fallback: Arc<S>,
}

impl<S: ?Sized> SourcePair<S> {
    pub fn new(primary: Arc<S>, fallback: Arc<S>) -> Self {
        Self { primary, fallback }
    }
}

impl<S: ?Sized> Clone for SourcePair<S> {
    fn clone(&self) -> Self {
        Self {
            primary: Arc::clone(&self.primary),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

/// Providers for all four domains
#[derive(Clone)]
pub struct CollectorSources {
    pub onchain: SourcePair<dyn OnChainSource>,
    pub marketplace: SourcePair<dyn MarketplaceSource>,
    pub social: SourcePair<dyn SocialSource>,
    pub identity: SourcePair<dyn IdentitySource>,
}

/// One cache per domain
#[derive(Clone)]
pub struct DomainCaches {
    pub onchain: Arc<dyn MetricsCache<OnChainData>>,
    pub marketplace: Arc<dyn MetricsCache<MarketplaceData>>,
    pub social: Arc<dyn MetricsCache<SocialData>>,
    pub identity: Arc<dyn MetricsCache<IdentityData>>,
}

impl Default for DomainCaches {
    fn default() -> Self {
        Self::in_memory(DEFAULT_MAX_ENTRIES)
    }
}

impl DomainCaches {
    /// In-memory caches holding at most `max_entries` addresses per domain
    pub fn in_memory(max_entries: usize) -> Self {
        Self {
            onchain: Arc::new(InMemoryCache::with_max_entries(max_entries)),
            marketplace: Arc::new(InMemoryCache::with_max_entries(max_entries)),
            social: Arc::new(InMemoryCache::with_max_entries(max_entries)),
            identity: Arc::new(InMemoryCache::with_max_entries(max_entries)),
        }
    }
}

/// Timeouts, cache lifetimes and chain constants used by the collector
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub onchain_timeout: Duration,
    pub marketplace_timeout: Duration,
    pub social_timeout: Duration,
    pub identity_timeout: Duration,
    pub cache_ttl: Duration,
    pub degraded_ttl: Duration,
    pub cache_max_entries: usize,
    pub chain: ChainParams,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl CollectorSettings {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            onchain_timeout: config.timeouts.onchain(),
            marketplace_timeout: config.timeouts.marketplace(),
            social_timeout: config.timeouts.social(),
            identity_timeout: config.timeouts.identity(),
            cache_ttl: config.cache.ttl(),
            degraded_ttl: config.cache.degraded_ttl(),
            cache_max_entries: config.cache.max_entries,
            chain: config.chain.params(),
        }
    }
}

/// Caller-supplied domain records; a set field bypasses that domain's sources and cache
#[derive(Debug, Clone, Default)]
pub struct CollectionOverrides {
    pub onchain: Option<OnChainData>,
    pub marketplace: Option<MarketplaceData>,
    pub social: Option<SocialData>,
    pub identity: Option<IdentityData>,
}

/// Collects complete metrics records for accounts
pub struct MetricsCollector {
    sources: CollectorSources,
    caches: DomainCaches,
    settings: CollectorSettings,
    registry: Arc<ProtocolRegistry>,
}

impl MetricsCollector {
    /// Collector with bounded in-memory caches and the shared Base registry
    pub fn new(sources: CollectorSources, settings: CollectorSettings) -> Self {
        Self {
            sources,
            caches: DomainCaches::in_memory(settings.cache_max_entries),
            settings,
            registry: ProtocolRegistry::shared(),
        }
    }

    /// HTTP-backed collector for the configured providers
    pub fn from_config(config: &ScoringConfig) -> anyhow::Result<Self> {
        let registry = ProtocolRegistry::shared();
        let sources = crate::sources::http_sources(config, Arc::clone(&registry))?;
        Ok(Self::new(sources, CollectorSettings::from_config(config)).with_registry(registry))
    }

    pub fn with_caches(mut self, caches: DomainCaches) -> Self {
        self.caches = caches;
        self
    }

    pub fn with_registry(mut self, registry: Arc<ProtocolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// Collect metrics for `address` as of now. Never fails; unavailable
    /// domains contribute zeros.
    pub async fn collect_metrics(
        &self,
        address: &str,
        overrides: CollectionOverrides,
    ) -> MetricsRecord {
        self.collect(address, overrides, Utc::now(), None).await
    }

    /// Collect metrics with an explicit evaluation time
    pub async fn collect_metrics_at(
        &self,
        address: &str,
        overrides: CollectionOverrides,
        now: DateTime<Utc>,
    ) -> MetricsRecord {
        self.collect(address, overrides, now, None).await
    }

    /// Collect metrics for `address` and score them
    pub async fn score(
        &self,
        address: &str,
        overrides: CollectionOverrides,
    ) -> (MetricsRecord, Score) {
        let metrics = self.collect_metrics(address, overrides).await;
        let score = calculate_score(&metrics);
        (metrics, score)
    }

    /// Collect metrics, abandoning any domain still outstanding after `deadline`
    pub async fn collect_metrics_with_deadline(
        &self,
        address: &str,
        overrides: CollectionOverrides,
        deadline: Duration,
    ) -> MetricsRecord {
        let deadline = Instant::now() + deadline;
        self.collect(address, overrides, Utc::now(), Some(deadline))
            .await
    }

    async fn collect(
        &self,
        address: &str,
        overrides: CollectionOverrides,
        now: DateTime<Utc>,
        deadline: Option<Instant>,
    ) -> MetricsRecord {
        let key = normalize_address(address);
        let key = key.as_str();
        let s = &self.settings;

        let onchain = within(
            deadline,
            "on-chain",
            self.resolve(
                "on-chain",
                key,
                overrides.onchain,
                self.caches.onchain.as_ref(),
                self.sources.onchain.primary.fetch_transactions(key),
                self.sources.onchain.fallback.fetch_transactions(key),
                s.onchain_timeout,
                || OnChainData::empty(key),
            ),
            || OnChainData::empty(key),
        );
        let marketplace = within(
            deadline,
            "marketplace",
            self.resolve(
                "marketplace",
                key,
                overrides.marketplace,
                self.caches.marketplace.as_ref(),
                self.sources.marketplace.primary.fetch_marketplace(key),
                self.sources.marketplace.fallback.fetch_marketplace(key),
                s.marketplace_timeout,
                MarketplaceData::default,
            ),
            MarketplaceData::default,
        );
        let social = within(
            deadline,
            "social",
            self.resolve(
                "social",
                key,
                overrides.social,
                self.caches.social.as_ref(),
                self.sources.social.primary.fetch_social(key),
                self.sources.social.fallback.fetch_social(key),
                s.social_timeout,
                SocialData::default,
            ),
            SocialData::default,
        );
        let identity = within(
            deadline,
            "identity",
            self.resolve(
                "identity",
                key,
                overrides.identity,
                self.caches.identity.as_ref(),
                self.sources.identity.primary.fetch_identity(key),
                self.sources.identity.fallback.fetch_identity(key),
                s.identity_timeout,
                IdentityData::default,
            ),
            IdentityData::default,
        );

        let (onchain, marketplace, social, identity) =
            tokio::join!(onchain, marketplace, social, identity);

        let metrics = aggregate(
            &onchain,
            &marketplace,
            &social,
            &identity,
            &self.registry,
            &s.chain,
            now,
        );

        info!(
            "Collected metrics for {}: {} active months, {} protocols, {} collections, social id {:?}, attested {}",
            key,
            metrics.active_months,
            metrics.unique_protocols,
            metrics.unique_collections,
            metrics.social_id,
            metrics.has_verified_attestation,
        );

        metrics
    }

    /// Override, else cache, else primary/fallback, else degraded-empty
    #[allow(clippy::too_many_arguments)]
    async fn resolve<V, P, F, E>(
        &self,
        domain: &'static str,
        key: &str,
        overridden: Option<V>,
        cache: &dyn MetricsCache<V>,
        primary: P,
        fallback: F,
        timeout: Duration,
        empty: E,
    ) -> V
    where
        V: Clone + Send + Sync + 'static,
        P: Future<Output = Result<V, SourceError>>,
        F: Future<Output = Result<V, SourceError>>,
        E: FnOnce() -> V,
    {
        if let Some(value) = overridden {
            debug!("{} data for {} supplied by caller", domain, key);
            return value;
        }

        if let Some(cached) = cache.get(key).await {
            debug!("{} cache hit for {}", domain, key);
            return cached;
        }

        match with_fallback(domain, primary, fallback, timeout).await {
            Some(value) => {
                cache.insert(key, value.clone(), self.settings.cache_ttl).await;
                value
            }
            None => {
                let value = empty();
                cache
                    .insert(key, value.clone(), self.settings.degraded_ttl)
                    .await;
                value
            }
        }
    }
}

/// Await `fut`, or produce `empty()` once `deadline` passes
async fn within<V, F, E>(deadline: Option<Instant>, domain: &str, fut: F, empty: E) -> V
where
    F: Future<Output = V>,
    E: FnOnce() -> V,
{
    let Some(deadline) = deadline else {
        return fut.await;
    };
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(value) => value,
        Err(_) => {
            warn!("{} collection abandoned at deadline, using empty data", domain);
            empty()
        }
    }
}

/// Fold the four domain records into one sanitized metrics record
pub fn aggregate(
    onchain: &OnChainData,
    marketplace: &MarketplaceData,
    social: &SocialData,
    identity: &IdentityData,
    registry: &ProtocolRegistry,
    chain: &ChainParams,
    now: DateTime<Utc>,
) -> MetricsRecord {
    let summary = OnChainSummary::derive(onchain, registry, chain, now);
    let mints = mint_counts(marketplace, now);

    MetricsRecord {
        active_months: summary.active_months,
        consecutive_streak: summary.consecutive_streak,
        wallet_age_months: summary.wallet_age_months,
        days_active: summary.days_active,
        gas_used_eth: summary.gas_used_eth,
        volume_usd: summary.volume_usd,
        unique_contracts: summary.unique_contracts,
        gas_induced_eth: summary.gas_induced_eth,
        last_active_timestamp: summary.last_active_timestamp,
        days_since_last_activity: summary.days_since_last_activity,

        liquidity_duration_days: summary.liquidity.duration_days,
        liquidity_positions: summary.liquidity.positions,
        lending_utilization: summary.liquidity.lending_utilization,
        capital_tier: summary.capital_tier,
        unique_protocols: summary.protocols.unique_protocols,
        vintage_contracts: summary.protocols.vintage_contracts,
        protocol_categories: summary.protocols.categories,

        unique_collections: mints.unique_collections,
        held_early_mints: mints.held_early_mints,
        secondary_market_volume_usd: non_negative(marketplace.secondary_volume_usd),
        creator_volume_usd: non_negative(marketplace.creator_volume_usd),

        social_percentile: social.percentile,
        social_rank: social.rank,
        social_id: social.social_id,
        followers: social.followers,
        following: social.following,
        casts: social.casts,

        has_verified_attestation: identity.has_verified_attestation,
        passport_score: identity.passport_score,

        // Achievements are supplied by callers
        badges: 0,
        competition_placement: None,
        early_adopter_vintage: summary.early_adopter_vintage,
    }
    .sanitized()
}
