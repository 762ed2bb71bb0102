use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use scope_core::config::CacheConfig;

use crate::extract::{DataUnavailable, MetricExtractor};
use crate::profile::build_profile_summary;

/// A computed profile and the instant it was computed.
#[derive(Debug, Clone)]
pub struct CachedProfile {
    pub profile_text: String,
    pub computed_at: Instant,
}

impl CachedProfile {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.computed_at) < ttl
    }
}

/// TTL-bounded, size-bounded profile store keyed by player id.
///
/// Reads never promote entries, so recency order is computation order and
/// the LRU victim is always the oldest `computed_at`. Concurrent misses for
/// the same key compute once; other keys are not blocked.
pub struct ProfileCache {
    entries: Mutex<LruCache<String, CachedProfile>>,
    in_flight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.capacity)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock_entries().cap().get()
    }

    /// Whether an entry (fresh or stale) is stored for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.lock_entries().contains(key)
    }

    /// The stored profile if it is still within TTL.
    pub fn get_fresh(&self, key: &str) -> Option<String> {
        let entries = self.lock_entries();
        entries
            .peek(key)
            .filter(|entry| entry.is_fresh(self.ttl, Instant::now()))
            .map(|entry| entry.profile_text.clone())
    }

    /// Store a freshly computed profile, evicting the oldest entry when full.
    pub fn insert(&self, key: &str, profile_text: String) {
        let entry = CachedProfile {
            profile_text,
            computed_at: Instant::now(),
        };
        let mut entries = self.lock_entries();
        if let Some((evicted, _)) = entries.push(key.to_string(), entry) {
            if evicted != key {
                debug!(evicted = %evicted, "profile cache full, evicted oldest entry");
            }
        }
    }

    /// Return the fresh profile for `key`, computing and storing it on a miss.
    ///
    /// A failed computation is logged, not cached, and yields `None`.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: Display,
    {
        if let Some(hit) = self.get_fresh(key) {
            debug!(player = %key, "profile cache hit");
            return Some(hit);
        }

        let gate = self.gate(key);
        let _release = GateRelease {
            cache: self,
            key,
            gate: gate.clone(),
        };
        let _permit = gate.lock_owned().await;

        // another caller may have filled it while we waited
        if let Some(hit) = self.get_fresh(key) {
            debug!(player = %key, "profile computed by concurrent request");
            return Some(hit);
        }

        info!(player = %key, "profile cache miss, computing");
        match compute().await {
            Ok(text) => {
                self.insert(key, text.clone());
                Some(text)
            }
            Err(e) => {
                warn!(player = %key, error = %e, "profile unavailable");
                None
            }
        }
    }

    fn gate(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn release_gate(&self, key: &str, gate: &Arc<AsyncMutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // the map's handle plus the releasing caller's
        if Arc::strong_count(gate) <= 2 {
            in_flight.remove(key);
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, LruCache<String, CachedProfile>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drops the per-key gate once no caller is waiting on it, including when
/// the computing future is cancelled.
struct GateRelease<'a> {
    cache: &'a ProfileCache,
    key: &'a str,
    gate: Arc<AsyncMutex<()>>,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        self.cache.release_gate(self.key, &self.gate);
    }
}

/// Cached gameplay profiles backed by the metric extractor.
pub struct ProfileService {
    cache: ProfileCache,
    extractor: Arc<MetricExtractor>,
}

impl ProfileService {
    pub fn new(cache: ProfileCache, extractor: Arc<MetricExtractor>) -> Self {
        Self { cache, extractor }
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    /// Profile text for `player_id`, or `None` when no history is available.
    pub async fn get(&self, player_id: &str) -> Option<String> {
        self.cache
            .get_or_compute(player_id, || async {
                let window = self.extractor.recent_matches(player_id).await?;
                Ok::<_, DataUnavailable>(build_profile_summary(&window))
            })
            .await
    }
}
