//! TTL cache keyed by namespace and key

use crate::clock::{Clock, SystemClock};
use crate::types::{CacheStats, Namespace};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type CacheKey = (Namespace, String);

#[derive(Clone)]
struct Stamped<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// In-memory cache where each entry expires `ttl` after it was inserted.
///
/// Each operation is atomic on its own; there is no cross-operation
/// transaction, so a read racing a write may observe either value.
/// `max_entries` bounds memory use; entries beyond it are evicted by the
/// backing store independently of their age.
pub struct TtlCache<V> {
    entries: Cache<CacheKey, Stamped<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache driven by the wall clock
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock
    pub fn with_clock(ttl: Duration, max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `value`, replacing any previous entry and restarting its TTL
    pub async fn put(&self, namespace: Namespace, key: &str, value: V) {
        let entry = Stamped {
            value,
            inserted_at: self.clock.now(),
        };
        self.entries.insert((namespace, key.to_string()), entry).await;
    }

    /// Look up a live entry. An expired entry is removed and reported as a miss.
    pub async fn get(&self, namespace: Namespace, key: &str) -> Option<V> {
        let cache_key = (namespace, key.to_string());

        if let Some(entry) = self.entries.get(&cache_key).await {
            if self.is_fresh(&entry) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%namespace, key, "Cache hit");
                return Some(entry.value);
            }

            debug!(%namespace, key, "Cache entry expired");
            self.entries.invalidate(&cache_key).await;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Drop the entry for `key` if there is one
    pub async fn invalidate(&self, namespace: Namespace, key: &str) {
        self.entries
            .invalidate(&(namespace, key.to_string()))
            .await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn is_fresh(&self, entry: &Stamped<V>) -> bool {
        // A clock that moved backwards yields a negative age; count it as zero.
        let age = (self.clock.now() - entry.inserted_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < self.ttl
    }
}
