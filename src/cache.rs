//! TTL cache with single-flight loading, used when reading exported artifacts.
//!
//! Entries are replaced wholesale; no caller can observe a partially written
//! value. Concurrent misses on one key share a single underlying load, and a
//! load keeps running (and populates the cache) even if the caller that
//! started it stops waiting.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{InsightError, Result};
use crate::metrics::CacheMetrics;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

pub struct RefreshableCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    // per-key load locks
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<V> RefreshableCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// The cached value, if it is younger than the TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` with the current time, overwriting any previous entry.
    pub async fn set(&self, key: &str, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry. Loads already in flight may repopulate their key.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let evicted = entries.len();
        entries.clear();
        CacheMetrics::record_clear(evicted);
        evicted
    }

    /// Number of stored entries, fresh or stale
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Read-through lookup. On a miss, or when `refresh` is set, run `loader`
    /// and store its value. Failed loads are not cached.
    pub async fn get_or_load<F, Fut>(self: &Arc<Self>, key: &str, refresh: bool, loader: F) -> Result<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        if !refresh {
            if let Some(value) = self.get(key).await {
                CacheMetrics::record_hit();
                return Ok(value);
            }
        }
        CacheMetrics::record_miss();

        let cache = Arc::clone(self);
        let key = key.to_string();
        let task = tokio::spawn(async move {
            let _guard = cache.acquire(&key).await;

            // another caller may have loaded while we waited for the lock
            if !refresh {
                if let Some(value) = cache.get(&key).await {
                    debug!(key = %key, "Load coalesced with an earlier caller");
                    return Ok(value);
                }
            }

            let started = Instant::now();
            let result = loader().await;
            CacheMetrics::record_load(started.elapsed().as_secs_f64(), result.is_ok());
            if let Ok(value) = &result {
                cache.set(&key, value.clone()).await;
                debug!(key = %key, "Cache entry loaded");
            }
            result
        });

        task.await
            .map_err(|e| InsightError::Internal(format!("cache load task failed: {}", e)))?
    }
}

impl<V> Default for RefreshableCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
