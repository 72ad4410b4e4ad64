use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::collector::{ChainParams, DEFAULT_MAX_ENTRIES};

/// Configuration for metrics collection and scoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// External data providers
    pub providers: ProvidersConfig,
    /// Per-domain call timeouts
    pub timeouts: TimeoutConfig,
    /// Domain cache lifetimes
    pub cache: CacheConfig,
    /// Chain constants
    pub chain: ChainConfig,
    /// Outbound HTTP security
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Primary Etherscan-compatible explorer API
    pub basescan_url: String,
    pub basescan_api_key: Option<String>,
    /// Fallback Etherscan-compatible explorer API
    pub blockscout_url: String,
    pub blockscout_api_key: Option<String>,
    /// Mint indexer base URL; marketplace data degrades when unset
    pub indexer_url: Option<String>,
    pub farcaster_hub_url: String,
    pub farcaster_fallback_hub_url: String,
    /// Social ranking API; percentile stays empty when unset
    pub openrank_url: Option<String>,
    /// Population the social rank is measured against
    pub openrank_population: u64,
    pub eas_graphql_url: String,
    pub eas_fallback_graphql_url: String,
    /// Attestation schema that marks a verified account
    pub eas_schema_id: String,
    pub passport_url: String,
    /// Passport score stays empty when unset
    pub passport_api_key: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            basescan_url: "https://api.basescan.org/api".to_string(),
            basescan_api_key: None,
            blockscout_url: "https://base.blockscout.com/api".to_string(),
            blockscout_api_key: None,
            indexer_url: None,
            farcaster_hub_url: "https://hub.farcaster.xyz".to_string(),
            farcaster_fallback_hub_url: "https://hub.pinata.cloud".to_string(),
            openrank_url: Some("https://openrank.xyz/api/v1".to_string()),
            openrank_population: 1_000_000,
            eas_graphql_url: "https://base.easscan.org/graphql".to_string(),
            eas_fallback_graphql_url: "https://easscan.org/graphql".to_string(),
            eas_schema_id: "0x4e51baf4c662bd2b8b87011e2e8e3c4b4e8e3c4b".to_string(),
            passport_url: "https://api.scorer.gitcoin.co".to_string(),
            passport_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub onchain_secs: u64,
    pub marketplace_secs: u64,
    pub social_secs: u64,
    /// Optional ranking call made inside the social fetch
    pub ranking_secs: u64,
    pub identity_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            onchain_secs: 30,
            marketplace_secs: 10,
            social_secs: 10,
            ranking_secs: 5,
            identity_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn onchain(&self) -> Duration {
        Duration::from_secs(self.onchain_secs)
    }

    pub fn marketplace(&self) -> Duration {
        Duration::from_secs(self.marketplace_secs)
    }

    pub fn social(&self) -> Duration {
        Duration::from_secs(self.social_secs)
    }

    pub fn ranking(&self) -> Duration {
        Duration::from_secs(self.ranking_secs)
    }

    pub fn identity(&self) -> Duration {
        Duration::from_secs(self.identity_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of successful fetches
    pub ttl_secs: u64,
    /// Lifetime of degraded-empty results
    pub degraded_ttl_secs: u64,
    /// Entry bound of each domain cache
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            degraded_ttl_secs: 300,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn degraded_ttl(&self) -> Duration {
        Duration::from_secs(self.degraded_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Flat ETH/USD rate for volume conversion
    pub eth_usd_price: f64,
    /// Unix seconds of network launch
    pub network_launch_timestamp: i64,
    /// Transactions requested per explorer call
    pub max_transactions: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        let params = ChainParams::default();
        Self {
            eth_usd_price: params.eth_usd_price,
            network_launch_timestamp: params.network_launch_timestamp,
            max_transactions: 1000,
        }
    }
}

impl ChainConfig {
    pub fn params(&self) -> ChainParams {
        ChainParams {
            eth_usd_price: self.eth_usd_price,
            network_launch_timestamp: self.network_launch_timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Require HTTPS for all provider URLs
    pub require_https: bool,
    /// Maximum provider response size in bytes
    pub max_response_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_https: true,
            max_response_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Mask secrets before they reach log output
    pub sanitize_logs: bool,
    /// Emit span open/close events
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            sanitize_logs: true,
            span_events: false,
        }
    }
}

impl ScoringConfig {
    /// Load configuration from `BSS_*` environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Providers
        let p = &mut config.providers;
        if let Ok(url) = env::var("BSS_BASESCAN_URL") {
            p.basescan_url = url;
        }
        p.basescan_api_key = optional_var("BSS_BASESCAN_API_KEY");
        if let Ok(url) = env::var("BSS_BLOCKSCOUT_URL") {
            p.blockscout_url = url;
        }
        p.blockscout_api_key = optional_var("BSS_BLOCKSCOUT_API_KEY");
        p.indexer_url = optional_var("BSS_INDEXER_URL");
        if let Ok(url) = env::var("BSS_FARCASTER_HUB_URL") {
            p.farcaster_hub_url = url;
        }
        if let Ok(url) = env::var("BSS_FARCASTER_FALLBACK_HUB_URL") {
            p.farcaster_fallback_hub_url = url;
        }
        if let Ok(url) = env::var("BSS_OPENRANK_URL") {
            // An empty value disables the ranking call
            p.openrank_url = (!url.is_empty()).then_some(url);
        }
        parse_var("BSS_OPENRANK_POPULATION", &mut p.openrank_population)?;
        if let Ok(url) = env::var("BSS_EAS_GRAPHQL_URL") {
            p.eas_graphql_url = url;
        }
        if let Ok(url) = env::var("BSS_EAS_FALLBACK_GRAPHQL_URL") {
            p.eas_fallback_graphql_url = url;
        }
        if let Ok(schema) = env::var("BSS_EAS_SCHEMA_ID") {
            p.eas_schema_id = schema;
        }
        if let Ok(url) = env::var("BSS_PASSPORT_URL") {
            p.passport_url = url;
        }
        p.passport_api_key = optional_var("BSS_PASSPORT_API_KEY");

        if p.basescan_api_key.is_none() {
            warn!("BSS_BASESCAN_API_KEY not set, explorer requests will be rate limited");
        }

        // Timeouts
        let t = &mut config.timeouts;
        parse_var("BSS_ONCHAIN_TIMEOUT_SECS", &mut t.onchain_secs)?;
        parse_var("BSS_MARKETPLACE_TIMEOUT_SECS", &mut t.marketplace_secs)?;
        parse_var("BSS_SOCIAL_TIMEOUT_SECS", &mut t.social_secs)?;
        parse_var("BSS_RANKING_TIMEOUT_SECS", &mut t.ranking_secs)?;
        parse_var("BSS_IDENTITY_TIMEOUT_SECS", &mut t.identity_secs)?;

        // Cache
        parse_var("BSS_CACHE_TTL_SECS", &mut config.cache.ttl_secs)?;
        // Degraded results live as long as successes unless set explicitly
        config.cache.degraded_ttl_secs = config.cache.ttl_secs;
        parse_var("BSS_DEGRADED_CACHE_TTL_SECS", &mut config.cache.degraded_ttl_secs)?;
        parse_var("BSS_CACHE_MAX_ENTRIES", &mut config.cache.max_entries)?;

        // Chain
        parse_var("BSS_ETH_USD_PRICE", &mut config.chain.eth_usd_price)?;
        parse_var(
            "BSS_NETWORK_LAUNCH_TIMESTAMP",
            &mut config.chain.network_launch_timestamp,
        )?;
        parse_var("BSS_MAX_TRANSACTIONS", &mut config.chain.max_transactions)?;

        // Security
        parse_var("BSS_REQUIRE_HTTPS", &mut config.security.require_https)?;
        parse_var(
            "BSS_MAX_RESPONSE_SIZE",
            &mut config.security.max_response_size,
        )?;

        // Logging
        if let Ok(level) = env::var("BSS_LOG_LEVEL") {
            config.logging.level = level;
        }
        parse_var("BSS_SANITIZE_LOGS", &mut config.logging.sanitize_logs)?;
        parse_var("BSS_LOG_SPAN_EVENTS", &mut config.logging.span_events)?;

        config.validate()?;

        info!(
            "Loaded scoring configuration (explorer: {}, hub: {}, indexer: {})",
            config.providers.basescan_url,
            config.providers.farcaster_hub_url,
            config.providers.indexer_url.as_deref().unwrap_or("disabled"),
        );

        Ok(config)
    }

    /// Validate configuration for security and consistency
    pub fn validate(&self) -> Result<()> {
        for (name, url) in self.provider_urls() {
            if url.is_empty() {
                return Err(anyhow::anyhow!("{} URL cannot be empty", name));
            }
            let parsed =
                url::Url::parse(url).with_context(|| format!("Invalid {} URL: {}", name, url))?;
            if self.security.require_https && parsed.scheme() != "https" {
                return Err(anyhow::anyhow!(
                    "HTTPS is required but {} URL is not HTTPS: {}",
                    name,
                    url
                ));
            }
        }

        let timeouts = [
            ("on-chain", self.timeouts.onchain_secs),
            ("marketplace", self.timeouts.marketplace_secs),
            ("social", self.timeouts.social_secs),
            ("ranking", self.timeouts.ranking_secs),
            ("identity", self.timeouts.identity_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(anyhow::anyhow!("{} timeout must be non-zero", name));
        }

        if !self.chain.eth_usd_price.is_finite() || self.chain.eth_usd_price <= 0.0 {
            return Err(anyhow::anyhow!(
                "ETH/USD price must be positive: {}",
                self.chain.eth_usd_price
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(anyhow::anyhow!("Cache max entries must be non-zero"));
        }

        if self.chain.max_transactions == 0 {
            return Err(anyhow::anyhow!("Max transactions must be non-zero"));
        }

        if self.providers.openrank_population == 0 {
            return Err(anyhow::anyhow!("OpenRank population must be non-zero"));
        }

        if self.security.max_response_size == 0 {
            return Err(anyhow::anyhow!("Max response size must be non-zero"));
        }

        if self.providers.eas_schema_id.is_empty() {
            return Err(anyhow::anyhow!("EAS schema id cannot be empty"));
        }

        Ok(())
    }

    /// Every configured provider URL, labelled
    fn provider_urls(&self) -> Vec<(&'static str, &str)> {
        let p = &self.providers;
        let mut urls = vec![
            ("BaseScan", p.basescan_url.as_str()),
            ("Blockscout", p.blockscout_url.as_str()),
            ("Farcaster hub", p.farcaster_hub_url.as_str()),
            ("Farcaster fallback hub", p.farcaster_fallback_hub_url.as_str()),
            ("EAS", p.eas_graphql_url.as_str()),
            ("EAS fallback", p.eas_fallback_graphql_url.as_str()),
            ("Passport", p.passport_url.as_str()),
        ];
        if let Some(url) = &p.indexer_url {
            urls.push(("Indexer", url.as_str()));
        }
        if let Some(url) = &p.openrank_url {
            urls.push(("OpenRank", url.as_str()));
        }
        urls
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Ok(raw) = env::var(name) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value", name))?;
    }
    Ok(())
}

/// Sanitize sensitive data for logging
pub fn sanitize_for_logging(data: &str) -> String {
    // URLs keep their shape; only sensitive query values are masked
    if let Some((base, query)) = data.split_once('?') {
        let query = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((name, _)) if is_sensitive(name) => format!("{}=***", name),
                _ => pair.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");
        return format!("{}?{}", base, query);
    }

    if !is_sensitive(data) {
        return data.to_string();
    }
    let head: String = data.chars().take(2).collect();
    format!("{}***", head)
}

fn is_sensitive(name: &str) -> bool {
    // Common patterns for sensitive data ("key" covers apikey and api_key)
    let sensitive_patterns = ["key", "token", "password", "secret", "credential"];
    let name = name.to_lowercase();
    sensitive_patterns.iter().any(|p| name.contains(p))
}

/// Mask a secret value outright, keeping a short prefix for correlation
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{}***", prefix)
}
