//! Integration tests for the scoring core
//!
//! These tests drive the collector end to end with stub providers
//! (degradation, fallback, caching, overrides, deadlines) and check the
//! engine's scenarios and universal properties.

use async_trait::async_trait;
use base_standard_score::collector::{MintCounts, Transaction, mint_counts};
use base_standard_score::scoring::{
    CompetitionPlacement, EarlyAdopterVintage, MAX_TOTAL_SCORE, badge_card, builder_card,
    competition_card, creator_card, decay_multiplier, minting_breadth_card, sybil_multiplier,
    tenure_card, timeliness_card,
};
use base_standard_score::{
    ChainParams, CollectionOverrides, CollectorSettings, CollectorSources, IdentityData,
    IdentitySource, MarketplaceData, MarketplaceSource, MetricsCollector, MetricsRecord,
    OnChainData, OnChainSource, ProtocolRegistry, SocialData, SocialSource, SourceError,
    SourcePair, Tier, calculate_score,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

const ADDRESS: &str = "0xAbC0000000000000000000000000000000000001";
const UNISWAP: &str = "0x4752ba5dbc23f44d87826276bf6fd6b1c372ad24";
const AAVE: &str = "0xb125e6687d4313864e53df431d5425969c15eb2f";

/// What a stub provider does when called
#[derive(Clone)]
enum Behavior<V> {
    Succeed(V),
    Fail,
    Slow(Duration, V),
}

/// Provider stub that counts its calls
struct Stub<V> {
    name: &'static str,
    behavior: Behavior<V>,
    calls: AtomicUsize,
}

impl<V: Clone> Stub<V> {
    fn new(name: &'static str, behavior: Behavior<V>) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<V, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(value) => Ok(value.clone()),
            Behavior::Fail => Err(SourceError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            }),
            Behavior::Slow(delay, value) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
        }
    }
}

#[async_trait]
impl OnChainSource for Stub<OnChainData> {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_transactions(&self, _address: &str) -> Result<OnChainData, SourceError> {
        self.respond().await
    }
}

#[async_trait]
impl MarketplaceSource for Stub<MarketplaceData> {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_marketplace(&self, _address: &str) -> Result<MarketplaceData, SourceError> {
        self.respond().await
    }
}

#[async_trait]
impl SocialSource for Stub<SocialData> {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_social(&self, _address: &str) -> Result<SocialData, SourceError> {
        self.respond().await
    }
}

#[async_trait]
impl IdentitySource for Stub<IdentityData> {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_identity(&self, _address: &str) -> Result<IdentityData, SourceError> {
        self.respond().await
    }
}

/// Handles to every stub so tests can inspect call counts
struct Stubs {
    onchain: (Arc<Stub<OnChainData>>, Arc<Stub<OnChainData>>),
    marketplace: (Arc<Stub<MarketplaceData>>, Arc<Stub<MarketplaceData>>),
    social: (Arc<Stub<SocialData>>, Arc<Stub<SocialData>>),
    identity: (Arc<Stub<IdentityData>>, Arc<Stub<IdentityData>>),
}

impl Stubs {
    fn healthy() -> Self {
        Self {
            onchain: (
                Stub::new("onchain-primary", Behavior::Succeed(active_wallet())),
                Stub::new("onchain-fallback", Behavior::Succeed(OnChainData::empty(ADDRESS))),
            ),
            marketplace: (
                Stub::new("marketplace-primary", Behavior::Succeed(collector_marketplace())),
                Stub::new("marketplace-fallback", Behavior::Succeed(MarketplaceData::default())),
            ),
            social: (
                Stub::new("social-primary", Behavior::Succeed(ranked_social())),
                Stub::new("social-fallback", Behavior::Succeed(SocialData::default())),
            ),
            identity: (
                Stub::new("identity-primary", Behavior::Succeed(verified_identity())),
                Stub::new("identity-fallback", Behavior::Succeed(IdentityData::default())),
            ),
        }
    }

    fn sources(&self) -> CollectorSources {
        CollectorSources {
            onchain: SourcePair::<dyn OnChainSource>::new(
                self.onchain.0.clone(),
                self.onchain.1.clone(),
            ),
            marketplace: SourcePair::<dyn MarketplaceSource>::new(
                self.marketplace.0.clone(),
                self.marketplace.1.clone(),
            ),
            social: SourcePair::<dyn SocialSource>::new(
                self.social.0.clone(),
                self.social.1.clone(),
            ),
            identity: SourcePair::<dyn IdentitySource>::new(
                self.identity.0.clone(),
                self.identity.1.clone(),
            ),
        }
    }

    fn collector(&self) -> MetricsCollector {
        MetricsCollector::new(self.sources(), CollectorSettings::default())
    }

    fn total_calls(&self) -> usize {
        self.onchain.0.calls()
            + self.onchain.1.calls()
            + self.marketplace.0.calls()
            + self.marketplace.1.calls()
            + self.social.0.calls()
            + self.social.1.calls()
            + self.identity.0.calls()
            + self.identity.1.calls()
    }
}

fn launch() -> i64 {
    ChainParams::default().network_launch_timestamp
}

fn tx(timestamp: i64, to: &str, value_eth: u128) -> Transaction {
    Transaction {
        hash: format!("0x{timestamp:x}"),
        timestamp,
        gas_used: 150_000,
        gas_price: 2_000_000_000,
        to: Some(to.to_string()),
        value: value_eth * 1_000_000_000_000_000_000,
    }
}

/// Month-1 adopter active for twelve consecutive months on Uniswap and Aave
fn active_wallet() -> OnChainData {
    let mut txs = Vec::new();
    for month in 0..12 {
        let ts = launch() + 86_400 + month * 31 * 86_400;
        txs.push(tx(ts, UNISWAP, 1));
        txs.push(tx(ts + 3_600, AAVE, 0));
    }
    OnChainData::from_transactions(ADDRESS, txs, &ProtocolRegistry::base_mainnet())
}

fn collector_marketplace() -> MarketplaceData {
    MarketplaceData {
        counts: Some(MintCounts {
            unique_collections: 5,
            held_early_mints: 3,
        }),
        secondary_volume_usd: 5_000.0,
        ..Default::default()
    }
}

fn ranked_social() -> SocialData {
    SocialData {
        percentile: Some(96.0),
        rank: Some(40_000),
        social_id: Some(1234),
        followers: 800,
        following: 300,
        casts: 120,
    }
}

fn verified_identity() -> IdentityData {
    IdentityData {
        has_verified_attestation: true,
        passport_score: Some(28.0),
    }
}

/// Evaluation time one week after the last transaction of `active_wallet`
fn evaluation_time() -> chrono::DateTime<Utc> {
    let last = launch() + 86_400 + 11 * 31 * 86_400 + 3_600;
    Utc.timestamp_opt(last + 7 * 86_400, 0).unwrap()
}

// ============================================================================
// Collection Tests
// ============================================================================

mod collection {
    use super::*;

    #[tokio::test]
    async fn test_collects_all_domains() {
        let stubs = Stubs::healthy();
        let metrics = stubs
            .collector()
            .collect_metrics_at(ADDRESS, CollectionOverrides::default(), evaluation_time())
            .await;

        assert_eq!(metrics.active_months, 12);
        assert_eq!(metrics.consecutive_streak, 12);
        assert_eq!(metrics.early_adopter_vintage, EarlyAdopterVintage::Month1);
        assert_eq!(metrics.days_since_last_activity, 7);
        assert_eq!(metrics.unique_contracts, 2);
        assert_eq!(metrics.unique_protocols, 2);
        assert_eq!(metrics.liquidity_positions, 1);
        assert_eq!(metrics.lending_utilization, 12.0);
        assert_eq!(
            metrics.protocol_categories,
            vec!["DEX".to_string(), "Lending".to_string()]
        );
        assert_eq!(metrics.unique_collections, 5);
        assert_eq!(metrics.held_early_mints, 3);
        assert_eq!(metrics.social_id, Some(1234));
        assert!(metrics.has_verified_attestation);

        // Only primaries were consulted
        assert_eq!(stubs.onchain.0.calls(), 1);
        assert_eq!(stubs.onchain.1.calls(), 0);
        assert_eq!(stubs.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_both_onchain_sources_failing_yields_zeros() {
        let mut stubs = Stubs::healthy();
        stubs.onchain = (
            Stub::new("onchain-primary", Behavior::Fail),
            Stub::new("onchain-fallback", Behavior::Fail),
        );

        let metrics = stubs
            .collector()
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;

        assert_eq!(metrics.active_months, 0);
        assert_eq!(metrics.consecutive_streak, 0);
        assert_eq!(metrics.wallet_age_months, 0);
        assert_eq!(metrics.days_active, 0);
        assert_eq!(metrics.gas_used_eth, 0.0);
        assert_eq!(metrics.volume_usd, 0.0);
        assert_eq!(metrics.unique_contracts, 0);
        assert_eq!(metrics.days_since_last_activity, 0);
        assert_eq!(metrics.unique_protocols, 0);
        assert_eq!(metrics.early_adopter_vintage, EarlyAdopterVintage::None);

        // Other domains are unaffected
        assert_eq!(metrics.unique_collections, 5);
        assert!(metrics.has_verified_attestation);

        assert_eq!(stubs.onchain.0.calls(), 1);
        assert_eq!(stubs.onchain.1.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_used_when_primary_fails() {
        let mut stubs = Stubs::healthy();
        stubs.social = (
            Stub::new("social-primary", Behavior::Fail),
            Stub::new("social-fallback", Behavior::Succeed(ranked_social())),
        );

        let metrics = stubs
            .collector()
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;

        assert_eq!(metrics.social_percentile, Some(96.0));
        assert_eq!(stubs.social.0.calls(), 1);
        assert_eq!(stubs.social.1.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_scores() {
        let stubs = Stubs {
            onchain: (
                Stub::new("a", Behavior::Fail),
                Stub::new("b", Behavior::Fail),
            ),
            marketplace: (
                Stub::new("a", Behavior::Fail),
                Stub::new("b", Behavior::Fail),
            ),
            social: (
                Stub::new("a", Behavior::Fail),
                Stub::new("b", Behavior::Fail),
            ),
            identity: (
                Stub::new("a", Behavior::Fail),
                Stub::new("b", Behavior::Fail),
            ),
        };

        let metrics = stubs
            .collector()
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;
        assert_eq!(metrics, MetricsRecord::default());

        let score = calculate_score(&metrics);
        assert_eq!(score.tier, Tier::Tourist);
        assert!(score.total <= MAX_TOTAL_SCORE);
    }

    #[tokio::test]
    async fn test_second_collection_served_from_cache() {
        let stubs = Stubs::healthy();
        let collector = stubs.collector();

        let first = collector
            .collect_metrics_at(ADDRESS, CollectionOverrides::default(), evaluation_time())
            .await;
        // Same account, different casing
        let second = collector
            .collect_metrics_at(
                &ADDRESS.to_lowercase(),
                CollectionOverrides::default(),
                evaluation_time(),
            )
            .await;

        assert_eq!(first, second);
        assert_eq!(stubs.total_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_ttl() {
        let stubs = Stubs::healthy();
        let collector = stubs.collector();

        collector
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;
        tokio::time::advance(Duration::from_secs(301)).await;
        collector
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;

        assert_eq!(stubs.onchain.0.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_degraded_result_uses_degraded_ttl() {
        let mut stubs = Stubs::healthy();
        stubs.identity = (
            Stub::new("identity-primary", Behavior::Fail),
            Stub::new("identity-fallback", Behavior::Fail),
        );
        let settings = CollectorSettings {
            degraded_ttl: Duration::from_secs(30),
            ..Default::default()
        };
        let collector = MetricsCollector::new(stubs.sources(), settings);

        collector
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;
        // Degraded-empty result is cached too
        collector
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;
        assert_eq!(stubs.identity.0.calls(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        collector
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;

        // Degraded entry expired, healthy entries did not
        assert_eq!(stubs.identity.0.calls(), 2);
        assert_eq!(stubs.onchain.0.calls(), 1);
    }

    #[tokio::test]
    async fn test_overrides_bypass_sources() {
        let stubs = Stubs::healthy();
        let overrides = CollectionOverrides {
            onchain: Some(OnChainData::empty(ADDRESS)),
            marketplace: Some(MarketplaceData::default()),
            social: Some(SocialData {
                social_id: Some(99),
                ..Default::default()
            }),
            identity: Some(IdentityData::default()),
        };

        let metrics = stubs.collector().collect_metrics(ADDRESS, overrides).await;

        assert_eq!(stubs.total_calls(), 0);
        assert_eq!(metrics.social_id, Some(99));
        assert_eq!(metrics.active_months, 0);
    }

    #[tokio::test]
    async fn test_partial_override() {
        let stubs = Stubs::healthy();
        let overrides = CollectionOverrides {
            identity: Some(IdentityData::default()),
            ..Default::default()
        };

        let metrics = stubs.collector().collect_metrics(ADDRESS, overrides).await;

        assert!(!metrics.has_verified_attestation);
        assert_eq!(stubs.identity.0.calls(), 0);
        assert_eq!(stubs.onchain.0.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_yields_degraded_values() {
        let mut stubs = Stubs::healthy();
        stubs.marketplace = (
            Stub::new(
                "marketplace-primary",
                Behavior::Slow(Duration::from_secs(8), collector_marketplace()),
            ),
            Stub::new("marketplace-fallback", Behavior::Fail),
        );

        let metrics = stubs
            .collector()
            .collect_metrics_with_deadline(
                ADDRESS,
                CollectionOverrides::default(),
                Duration::from_secs(2),
            )
            .await;

        assert_eq!(metrics.unique_collections, 0);
        assert_eq!(metrics.held_early_mints, 0);
        // Fast domains completed
        assert!(metrics.active_months > 0);
        assert!(metrics.has_verified_attestation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_primary_times_out_to_fallback() {
        let mut stubs = Stubs::healthy();
        stubs.social = (
            Stub::new(
                "social-primary",
                Behavior::Slow(Duration::from_secs(60), SocialData::default()),
            ),
            Stub::new("social-fallback", Behavior::Succeed(ranked_social())),
        );

        let metrics = stubs
            .collector()
            .collect_metrics(ADDRESS, CollectionOverrides::default())
            .await;

        assert_eq!(metrics.social_id, Some(1234));
        assert_eq!(stubs.social.1.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_bound_evicts_oldest_address() {
        let stubs = Stubs::healthy();
        let settings = CollectorSettings {
            cache_max_entries: 2,
            ..Default::default()
        };
        let collector = MetricsCollector::new(stubs.sources(), settings);
        let addresses = [
            "0x0000000000000000000000000000000000000001",
            "0x0000000000000000000000000000000000000002",
            "0x0000000000000000000000000000000000000003",
        ];

        for address in addresses {
            collector
                .collect_metrics(address, CollectionOverrides::default())
                .await;
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        assert_eq!(stubs.onchain.0.calls(), 3);

        // Newest two are still cached
        collector
            .collect_metrics(addresses[2], CollectionOverrides::default())
            .await;
        collector
            .collect_metrics(addresses[1], CollectionOverrides::default())
            .await;
        assert_eq!(stubs.onchain.0.calls(), 3);

        // The first one was evicted to make room
        collector
            .collect_metrics(addresses[0], CollectionOverrides::default())
            .await;
        assert_eq!(stubs.onchain.0.calls(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_collections() {
        let stubs = Stubs::healthy();
        let collector = Arc::new(stubs.collector());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let collector = Arc::clone(&collector);
            handles.push(tokio::spawn(async move {
                collector
                    .collect_metrics_at(ADDRESS, CollectionOverrides::default(), evaluation_time())
                    .await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}

// ============================================================================
// Marketplace Derivation Tests
// ============================================================================

mod marketplace {
    use super::*;
    use base_standard_score::collector::MintEvent;

    #[test]
    fn test_early_mints_from_events() {
        let collection_launch = 1_700_000_000;
        let now = Utc.timestamp_opt(collection_launch + 120 * 86_400, 0).unwrap();
        let mint = |collection: &str, offset_days: i64, still_held: bool| MintEvent {
            token_id: "1".to_string(),
            collection_address: collection.to_string(),
            mint_timestamp: collection_launch + offset_days * 86_400,
            still_held,
            collection_launch_timestamp: collection_launch,
        };

        let data = MarketplaceData {
            mints: vec![
                mint("0x01", 2, true),
                mint("0x02", 10, true),
                mint("0x03", 45, true),
                mint("0x04", 1, false),
            ],
            ..Default::default()
        };

        let counts = mint_counts(&data, now);
        assert_eq!(counts.unique_collections, 4);
        assert_eq!(counts.held_early_mints, 2);
    }
}

// ============================================================================
// End-to-End Scoring Tests
// ============================================================================

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn test_score_collects_and_scores() {
        let stubs = Stubs::healthy();
        let (metrics, score) = stubs
            .collector()
            .score(ADDRESS, CollectionOverrides::default())
            .await;

        assert_eq!(metrics.unique_collections, 5);
        assert_eq!(score, calculate_score(&metrics));
        assert_eq!(score.sybil_multiplier, 1.7);
        assert_eq!(stubs.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_collect_then_score() {
        let stubs = Stubs::healthy();
        let metrics = stubs
            .collector()
            .collect_metrics_at(ADDRESS, CollectionOverrides::default(), evaluation_time())
            .await;
        let score = calculate_score(&metrics);

        assert_eq!(score.sybil_multiplier, 1.7);
        assert_eq!(score.decay.decay_multiplier, 1.0);
        assert!(!score.decay.will_decay);
        assert_eq!(score.cards.minting_breadth, 100);
        assert_eq!(score.cards.timeliness, 150);
        assert_eq!(score.cards.creator, 600);
        assert_eq!(score.cards.social_rank, 750);
        assert_eq!(score.cards.early_adopter, 200);
        assert!(score.total > 0 && score.total <= MAX_TOTAL_SCORE);
        assert_eq!(score.tier, Tier::from_total(score.total));
    }

    #[test]
    fn test_score_serializes_for_persistence() {
        let score = calculate_score(&MetricsRecord {
            active_months: 6,
            ..Default::default()
        });
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["tier"], "TOURIST");
        assert!(json["decay"]["willDecay"].is_boolean());
        assert!(json["cards"]["tenure"].is_u64());
    }
}

// ============================================================================
// Scoring Scenario Tests
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_card_scenarios() {
        assert_eq!(tenure_card(0), 0);
        assert_eq!(minting_breadth_card(5), 100);
        assert_eq!(timeliness_card(3), 150);
        assert_eq!(builder_card(0.5), 200);
        assert_eq!(creator_card(5_000.0), 600);
        assert_eq!(badge_card(10), 300);
        assert_eq!(competition_card(Some(CompetitionPlacement::Winner)), 500);
    }

    #[test]
    fn test_tier_boundaries() {
        let cases = [
            (350, Tier::Tourist),
            (351, Tier::Resident),
            (650, Tier::Resident),
            (651, Tier::Builder),
            (850, Tier::Builder),
            (851, Tier::Based),
            (950, Tier::Based),
            (951, Tier::Legend),
        ];
        for (total, tier) in cases {
            assert_eq!(Tier::from_total(total), tier, "total {}", total);
        }
    }

    #[test]
    fn test_decay_scenarios() {
        let score = calculate_score(&MetricsRecord {
            days_since_last_activity: 30,
            ..Default::default()
        });
        assert_eq!(score.decay.decay_multiplier, 0.95);
        assert!(score.decay.will_decay);

        let score = calculate_score(&MetricsRecord::default());
        assert_eq!(score.decay.decay_multiplier, 1.0);
        assert!(!score.decay.will_decay);

        let score = calculate_score(&MetricsRecord {
            days_since_last_activity: 365,
            ..Default::default()
        });
        assert_eq!(score.decay.decay_multiplier, 0.5);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod properties {
    use super::*;
    use base_standard_score::scoring::CapitalTier;
    use proptest::prelude::*;

    fn volume() -> impl Strategy<Value = f64> {
        prop_oneof![
            4 => 0.0..1_000_000.0f64,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
            1 => -1_000.0..0.0f64,
        ]
    }

    fn optional_score() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![Just(None), (-10.0..150.0f64).prop_map(Some)]
    }

    prop_compose! {
        fn metrics()(
            (active_months, consecutive_streak, wallet_age_months, days_since_last_activity)
                in (0..200u32, 0..200u32, 0..200u32, 0..2_000u32),
            (gas_used_eth, volume_usd, gas_induced_eth, lending_utilization) in
                (volume(), volume(), volume(), volume()),
            (liquidity_duration_days, unique_protocols, vintage_contracts, categories)
                in (0..1_000u32, 0..100u32, 0..100u32, 0..8usize),
            (unique_collections, held_early_mints, secondary, badges)
                in (0..100u32, 0..100u32, volume(), 0..40u32),
            (social_percentile, passport_score, attested, has_social)
                in (optional_score(), optional_score(), any::<bool>(), any::<bool>()),
            (capital, vintage, placement) in (0..3u8, 0..3u8, 0..4u8),
        ) -> MetricsRecord {
            MetricsRecord {
                active_months,
                consecutive_streak,
                wallet_age_months,
                days_since_last_activity,
                gas_used_eth,
                volume_usd,
                gas_induced_eth,
                lending_utilization,
                liquidity_duration_days,
                unique_protocols,
                vintage_contracts,
                protocol_categories: (0..categories).map(|i| format!("cat{i}")).collect(),
                unique_collections,
                held_early_mints,
                secondary_market_volume_usd: secondary,
                badges,
                social_percentile,
                passport_score,
                has_verified_attestation: attested,
                social_id: has_social.then_some(7),
                capital_tier: match capital {
                    0 => CapitalTier::Low,
                    1 => CapitalTier::Mid,
                    _ => CapitalTier::High,
                },
                early_adopter_vintage: match vintage {
                    0 => EarlyAdopterVintage::None,
                    1 => EarlyAdopterVintage::Month1,
                    _ => EarlyAdopterVintage::Genesis,
                },
                competition_placement: match placement {
                    0 => None,
                    1 => Some(CompetitionPlacement::Submission),
                    2 => Some(CompetitionPlacement::Finalist),
                    _ => Some(CompetitionPlacement::Winner),
                },
                ..Default::default()
            }
        }
    }

    proptest! {
        #[test]
        fn total_is_bounded(m in metrics()) {
            let score = calculate_score(&m);
            prop_assert!(score.total <= MAX_TOTAL_SCORE);
            prop_assert!(score.pillars.capital <= 400);
            prop_assert!(score.pillars.diversity <= 300);
            prop_assert!(score.pillars.identity <= 300);
        }

        #[test]
        fn scoring_is_deterministic(m in metrics()) {
            prop_assert_eq!(calculate_score(&m), calculate_score(&m));
        }

        #[test]
        fn tier_matches_total(m in metrics()) {
            let score = calculate_score(&m);
            prop_assert_eq!(score.tier, Tier::from_total(score.total));
        }

        #[test]
        fn tier_is_monotonic(a in 0..=1000u32, b in 0..=1000u32) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Tier::from_total(low) <= Tier::from_total(high));
        }

        #[test]
        fn minting_card_is_monotonic_and_capped(a in 0..10_000u32, b in 0..10_000u32) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(minting_breadth_card(low) <= minting_breadth_card(high));
            prop_assert!(minting_breadth_card(high) <= 500);
        }

        #[test]
        fn decay_is_non_increasing_and_floored(a in 0..100_000u32, b in 0..100_000u32) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(decay_multiplier(low) >= decay_multiplier(high));
            prop_assert!(decay_multiplier(high) >= 0.5);
        }

        #[test]
        fn sybil_multiplier_is_bounded(m in metrics()) {
            let sybil = sybil_multiplier(&m);
            prop_assert!((1.0..=1.7).contains(&sybil));
        }
    }
}
