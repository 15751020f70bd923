//! Two-level place cache: moka in memory, the store on disk

use crate::config::CacheConfig;
use chrono::Utc;
use hangai_core::{Place, SearchKey};
use hangai_db::Store;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Places held in memory with the time they were fetched
#[derive(Clone)]
struct Entry {
    fetched_at: i64,
    places: Arc<Vec<Place>>,
}

/// Cache of nearby-search results keyed by location, mood and radius
#[derive(Clone)]
pub struct PlaceCache {
    memory: Cache<SearchKey, Entry>,
    store: Option<Arc<Store>>,
    ttl_secs: u64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl PlaceCache {
    /// Create a memory-only cache
    pub fn new(config: &CacheConfig) -> Self {
        let memory = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self {
            memory,
            store: None,
            ttl_secs: config.ttl_secs,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a cache that persists entries in `store`
    pub fn with_store(config: &CacheConfig, store: Arc<Store>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(config)
        }
    }

    fn is_fresh(&self, fetched_at: i64) -> bool {
        let age = Utc::now().timestamp().saturating_sub(fetched_at);
        age < 0 || (age as u64) < self.ttl_secs
    }

    /// Look up a search, falling back to the store
    pub async fn get(&self, key: &SearchKey) -> Option<Arc<Vec<Place>>> {
        if let Some(entry) = self.memory.get(key).await {
            if self.is_fresh(entry.fetched_at) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "memory cache hit");
                return Some(entry.places);
            }
            self.memory.invalidate(key).await;
        }

        let persisted = match &self.store {
            Some(store) => match store.load_places(key) {
                Ok(found) => found,
                Err(e) => {
                    warn!(%key, error = %e, "reading cached places failed");
                    None
                }
            },
            None => None,
        };

        match persisted {
            Some(cached) if self.is_fresh(cached.fetched_at) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "store cache hit");
                let places = Arc::new(cached.places);
                self.remember(*key, cached.fetched_at, places.clone()).await;
                Some(places)
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "cache miss");
                None
            }
        }
    }

    /// Remember a search result in memory and on disk
    pub async fn insert(&self, key: SearchKey, places: Vec<Place>) -> Arc<Vec<Place>> {
        let fetched_at = Utc::now().timestamp();
        if let Some(store) = &self.store {
            if let Err(e) = store.save_places(&key, &places, fetched_at) {
                warn!(%key, error = %e, "persisting places failed");
            }
        }
        let places = Arc::new(places);
        self.remember(key, fetched_at, places.clone()).await;
        places
    }

    async fn remember(&self, key: SearchKey, fetched_at: i64, places: Arc<Vec<Place>>) {
        self.memory.insert(key, Entry { fetched_at, places }).await;
    }

    /// Drop stale persisted searches, then load the fresh ones into memory
    ///
    /// Returns how many searches were loaded.
    pub async fn warm(&self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };
        let cutoff = Utc::now()
            .timestamp()
            .saturating_sub(i64::try_from(self.ttl_secs).unwrap_or(i64::MAX));
        match store.prune_places(cutoff) {
            Ok(0) => {}
            Ok(pruned) => debug!(pruned, "pruned stale searches"),
            Err(e) => warn!(error = %e, "pruning place cache failed"),
        }

        let cached = match store.load_all_places() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "loading place cache failed");
                return 0;
            }
        };

        let mut loaded = 0;
        for entry in cached {
            if self.is_fresh(entry.fetched_at) {
                self.remember(entry.key, entry.fetched_at, Arc::new(entry.places))
                    .await;
                loaded += 1;
            }
        }
        debug!(loaded, "warmed place cache");
        loaded
    }

    /// Drop every entry; returns how many persisted searches were removed
    pub async fn clear(&self) -> usize {
        self.memory.invalidate_all();
        self.memory.run_pending_tasks().await;
        match &self.store {
            Some(store) => store.clear_places().unwrap_or_else(|e| {
                warn!(error = %e, "clearing persisted places failed");
                0
            }),
            None => 0,
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.memory.run_pending_tasks().await;
        CacheStats {
            entry_count: self.memory.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: u64,
    pub hits: u64,
    pub misses: u64,
}
