//! Common query patterns for the database.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::{CachedPlaces, Store};
use hangai_core::{Mood, SearchKey};

impl Store {
    /// Get the usage counters of one kind in insertion order.
    pub(crate) fn usage_rows(&self, kind: &str) -> Result<Vec<StoredUsage>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredUsage>(StoredUsageKey::kind)?;
        let iter = scan.start_with(kind)?;
        let rows: std::result::Result<Vec<StoredUsage>, _> = iter.collect();
        let mut rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        // `start_with` is a prefix match
        rows.retain(|row| row.kind == kind);
        rows.sort_by_key(|row| row.position);
        Ok(rows)
    }

    /// Get every usage counter regardless of kind.
    pub(crate) fn all_usage_rows(&self) -> Result<Vec<StoredUsage>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredUsage>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredUsage>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }

    /// Get the cached searches for a mood.
    pub fn places_for_mood(&self, mood: Mood) -> Result<Vec<CachedPlaces>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredPlaces>(StoredPlacesKey::mood)?;
        let iter = scan.start_with(mood.as_str())?;
        let rows: std::result::Result<Vec<StoredPlaces>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let key = SearchKey::parse(&row.key).ok()?;
                let places = row.to_places().ok()?;
                Some(CachedPlaces {
                    key,
                    places,
                    fetched_at: row.fetched_at,
                })
            })
            .filter(|cached| cached.key.mood == mood)
            .collect())
    }
}
