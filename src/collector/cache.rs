//! Per-domain metrics caches
//!
//! The collector depends on the [`MetricsCache`] trait only; callers can
//! plug in a shared store. [`InMemoryCache`] keeps at most `max_entries`
//! entries in a `DashMap`, expiring them lazily on read and sweeping
//! expired ones when an insert reaches the bound.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Entry bound of an [`InMemoryCache`] built with `new()`
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Keyed store with per-entry TTL
#[async_trait]
pub trait MetricsCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Fresh value for `key`, if any
    async fn get(&self, key: &str) -> Option<V>;

    /// Store `value` for `ttl`
    async fn insert(&self, key: &str, value: V, ttl: Duration);
}

/// Process-local cache: key -> (value, expires at)
#[derive(Debug)]
pub struct InMemoryCache<V> {
    entries: DashMap<String, (V, Instant)>,
    max_entries: usize,
}

impl<V> Default for InMemoryCache<V> {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl<V> InMemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `max_entries` entries (at least one)
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of stored entries, expired ones included until cleanup
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
    }

    /// Make room for one new key: sweep expired entries, then evict the
    /// entries closest to expiry until below the bound
    fn make_room(&self) {
        self.cleanup();

        let excess = (self.entries.len() + 1).saturating_sub(self.max_entries);
        if excess == 0 {
            return;
        }

        let mut by_expiry: Vec<(Instant, String)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().1, entry.key().clone()))
            .collect();
        by_expiry.sort_unstable();

        for (_, key) in by_expiry.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        debug!("Cache full, evicted {} entries", excess);
    }
}

#[async_trait]
impl<V> MetricsCache<V> for InMemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let hit = self.entries.get(key).and_then(|entry| {
            let (value, expires_at) = entry.value();
            (*expires_at > now).then(|| value.clone())
        });

        if hit.is_none() {
            self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
        }
        hit
    }

    async fn insert(&self, key: &str, value: V, ttl: Duration) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }
        self.entries
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }
}
