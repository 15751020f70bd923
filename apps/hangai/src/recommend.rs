//! Cached, multi-mood place recommendation

use crate::cache::PlaceCache;
use crate::overpass::{FetchError, PlaceSource};
use hangai_core::{merge_closest, Coordinates, Mood, Place, Radius, SearchKey};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a mood's places came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// Result of a multi-mood search
#[derive(Debug, Clone, Default)]
pub struct Recommendation {
    /// Places across all moods, deduplicated by name, closest first
    pub places: Vec<Place>,
    /// Moods whose lookup failed
    pub failed: Vec<(Mood, String)>,
    /// Moods answered from the cache
    pub cached: Vec<Mood>,
}

/// Looks up places per mood through the cache and a place source
pub struct Recommender<S> {
    source: S,
    cache: PlaceCache,
}

impl<S: PlaceSource> Recommender<S> {
    pub fn new(source: S, cache: PlaceCache) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &PlaceCache {
        &self.cache
    }

    /// Places for one mood, from the cache when possible
    ///
    /// Successful lookups are cached even when empty; failures are not.
    pub async fn places_for(
        &self,
        origin: Coordinates,
        mood: Mood,
        radius: Radius,
    ) -> Result<(Arc<Vec<Place>>, Origin), FetchError> {
        let key = SearchKey::new(origin, mood, radius);
        if let Some(places) = self.cache.get(&key).await {
            info!(%mood, "Using cached results");
            return Ok((places, Origin::Cache));
        }

        let places = self.source.fetch(origin, mood, radius).await?;
        let places = self.cache.insert(key, places).await;
        Ok((places, Origin::Network))
    }

    /// Search every mood and merge the results
    pub async fn recommend(
        &self,
        origin: Coordinates,
        moods: &[Mood],
        radius: Radius,
    ) -> Recommendation {
        let mut recommendation = Recommendation::default();
        let mut all = Vec::new();

        for &mood in moods {
            match self.places_for(origin, mood, radius).await {
                Ok((places, origin)) => {
                    if origin == Origin::Cache {
                        recommendation.cached.push(mood);
                    }
                    all.extend(places.iter().cloned());
                }
                Err(e) => {
                    warn!(%mood, error = %e, "skipping mood");
                    recommendation.failed.push((mood, e.to_string()));
                }
            }
        }

        recommendation.places = merge_closest(all);
        recommendation
    }
}
