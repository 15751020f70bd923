//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use hangai_core::{Mood, Place, SearchKey, UserProfile};
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredHistoryEntry>().unwrap();
    models.define::<StoredFavorite>().unwrap();
    models.define::<StoredUsage>().unwrap();
    models.define::<StoredPlaces>().unwrap();
    models
});

/// A cached search result read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPlaces {
    pub key: SearchKey,
    pub places: Vec<Place>,
    /// Unix timestamp of the fetch.
    pub fetched_at: i64,
}

impl CachedPlaces {
    /// Age in seconds relative to `now`.
    pub fn age_secs(&self, now: i64) -> i64 {
        now.saturating_sub(self.fetched_at)
    }
}

/// Rows that make up a stored profile.
#[derive(Default)]
struct ProfileRows {
    history: Vec<StoredHistoryEntry>,
    favorites: Vec<StoredFavorite>,
    usage: Vec<StoredUsage>,
}

impl ProfileRows {
    /// Encode a profile; favorites are flattened in mood then list order.
    fn from_profile(profile: &UserProfile) -> Result<Self> {
        let history = profile
            .history
            .iter()
            .enumerate()
            .map(|(seq, entry)| StoredHistoryEntry::from_entry(seq as u64, entry))
            .collect();

        let mut favorites = Vec::new();
        for (mood, list) in &profile.favorites {
            for favorite in list {
                let id = favorites.len() as u64;
                favorites.push(StoredFavorite::from_favorite(id, *mood, favorite)?);
            }
        }

        let moods = profile
            .mood_usage
            .iter()
            .enumerate()
            .map(|(position, (mood, count))| {
                StoredUsage::new(USAGE_MOOD, mood.as_str(), *count, position as u64)
            });
        let places = profile
            .place_usage
            .iter()
            .enumerate()
            .map(|(position, (name, count))| {
                StoredUsage::new(USAGE_PLACE, name, *count, position as u64)
            });

        Ok(Self {
            history,
            favorites,
            usage: moods.chain(places).collect(),
        })
    }
}

/// Database store for the profile and the place cache.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        debug!(path = %path.as_ref().display(), "opened store");
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Save the complete profile, replacing what was stored before.
    ///
    /// Old and new rows are swapped in a single transaction, so a failed
    /// save leaves the previous profile in place.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let rows = ProfileRows::from_profile(profile)?;
        let (history, favorites) = (rows.history.len(), rows.favorites.len());
        self.replace_profile_rows(rows)?;
        debug!(history, favorites, "saved profile");
        Ok(())
    }

    /// Load the profile; an empty profile if nothing was stored yet.
    pub fn load_profile(&self) -> Result<UserProfile> {
        let mut profile = UserProfile::new();

        // Load history
        for stored in self.history_rows()? {
            match stored.to_entry() {
                Some(entry) => profile.history.push(entry),
                None => warn!(seq = stored.seq, "skipping undecodable history entry"),
            }
        }

        // Load favorites
        for stored in self.favorite_rows()? {
            match stored.to_favorite() {
                Ok((mood, favorite)) => profile.favorites.entry(mood).or_default().push(favorite),
                Err(e) => warn!(id = stored.id, error = %e, "skipping undecodable favorite"),
            }
        }

        // Load usage counters
        for stored in self.usage_rows(USAGE_MOOD)? {
            match stored.name.parse::<Mood>() {
                Ok(mood) => {
                    profile.mood_usage.insert(mood, stored.count);
                }
                Err(_) => warn!(key = %stored.key, "skipping unknown mood counter"),
            }
        }
        for stored in self.usage_rows(USAGE_PLACE)? {
            profile.place_usage.insert(stored.name, stored.count);
        }

        Ok(profile)
    }

    /// Remove history, favorites and usage counters.
    pub fn clear_profile(&self) -> Result<()> {
        self.replace_profile_rows(ProfileRows::default())
    }

    fn replace_profile_rows(&self, rows: ProfileRows) -> Result<()> {
        // First, collect the rows being replaced
        let history = self.history_rows()?;
        let favorites = self.favorite_rows()?;
        let usage = self.all_usage_rows()?;

        let rw = self.db.rw_transaction()?;
        for row in history {
            rw.remove(row)?;
        }
        for row in favorites {
            rw.remove(row)?;
        }
        for row in usage {
            rw.remove(row)?;
        }
        for row in rows.history {
            rw.insert(row)?;
        }
        for row in rows.favorites {
            rw.insert(row)?;
        }
        for row in rows.usage {
            rw.insert(row)?;
        }
        rw.commit()?;
        Ok(())
    }

    /// Export the stored profile as pretty JSON.
    pub fn export_profile_json(&self) -> Result<String> {
        let profile = self.load_profile()?;
        serde_json::to_string_pretty(&profile).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Save the places found for a search at `fetched_at` (unix seconds).
    pub fn save_places(&self, key: &SearchKey, places: &[Place], fetched_at: i64) -> Result<()> {
        let stored =
            StoredPlaces::from_places(key.to_string(), key.mood.as_str(), places, fetched_at)?;
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        Ok(())
    }

    /// Load the places stored for a search.
    pub fn load_places(&self, key: &SearchKey) -> Result<Option<CachedPlaces>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlaces> = r.get().primary(key.to_string())?;
        stored.map(decode_places).transpose()
    }

    /// Load every stored search, skipping rows that no longer decode.
    pub fn load_all_places(&self) -> Result<Vec<CachedPlaces>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlaces>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredPlaces>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match decode_places(row) {
                Ok(cached) => Some(cached),
                Err(e) => {
                    warn!(error = %e, "skipping cached search");
                    None
                }
            })
            .collect())
    }

    /// Delete every stored search; returns how many were removed.
    pub fn clear_places(&self) -> Result<usize> {
        let keys: Vec<String> = {
            let r = self.db.r_transaction()?;
            let scan = r.scan().primary::<StoredPlaces>()?;
            let iter = scan.all()?;
            let rows: std::result::Result<Vec<StoredPlaces>, _> = iter.collect();
            let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
            rows.into_iter().map(|row| row.key).collect()
        };
        self.remove_places(keys)
    }

    /// Delete stored searches fetched before `cutoff` (unix seconds).
    pub fn prune_places(&self, cutoff: i64) -> Result<usize> {
        let keys: Vec<String> = {
            let r = self.db.r_transaction()?;
            let scan = r.scan().primary::<StoredPlaces>()?;
            let iter = scan.all()?;
            let rows: std::result::Result<Vec<StoredPlaces>, _> = iter.collect();
            let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
            rows.into_iter()
                .filter(|row| row.fetched_at < cutoff)
                .map(|row| row.key)
                .collect()
        };
        self.remove_places(keys)
    }

    fn remove_places(&self, keys: Vec<String>) -> Result<usize> {
        let rw = self.db.rw_transaction()?;
        let mut removed = 0;
        for key in keys {
            if let Some(row) = rw.get().primary::<StoredPlaces>(key)? {
                rw.remove(row)?;
                removed += 1;
            }
        }
        rw.commit()?;
        Ok(removed)
    }

    fn history_rows(&self) -> Result<Vec<StoredHistoryEntry>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredHistoryEntry>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredHistoryEntry>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }

    fn favorite_rows(&self) -> Result<Vec<StoredFavorite>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredFavorite>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredFavorite>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }
}

fn decode_places(row: StoredPlaces) -> Result<CachedPlaces> {
    let key = SearchKey::parse(&row.key).map_err(|e| Error::Corrupt {
        key: row.key.clone(),
        reason: e.to_string(),
    })?;
    let places = row.to_places().map_err(|e| Error::Corrupt {
        key: row.key.clone(),
        reason: e.to_string(),
    })?;
    Ok(CachedPlaces {
        key,
        places,
        fetched_at: row.fetched_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangai_core::{Coordinates, HistoryEntry, Radius};
    use std::collections::BTreeMap;

    fn place(name: &str, distance_km: f64, tag: (&str, &str)) -> Place {
        Place {
            name: name.to_string(),
            coords: Coordinates {
                lat: 48.85,
                lon: 2.35,
            },
            distance_km,
            tags: BTreeMap::from([(tag.0.to_string(), tag.1.to_string())]),
        }
    }

    fn key(mood: Mood) -> SearchKey {
        SearchKey::new(
            Coordinates {
                lat: 48.8566,
                lon: 2.3522,
            },
            mood,
            Radius(2500),
        )
    }

    fn sample_profile() -> UserProfile {
        let mut profile = UserProfile::new();
        profile.record_search(
            HistoryEntry::new("feeling sad", vec![Mood::Sad], Radius(1000)),
            10,
        );
        profile.record_search(
            HistoryEntry::new("coffee time", vec![Mood::Happy, Mood::Adventurous], Radius(2500)),
            10,
        );
        profile.remember_favorites(
            &[Mood::Sad, Mood::Happy],
            &[
                place("Jardin", 0.3, ("leisure", "park")),
                place("Le Cafe", 0.5, ("amenity", "cafe")),
            ],
        );
        profile
    }

    #[test]
    fn test_empty_store_has_empty_profile() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.load_profile().unwrap(), UserProfile::new());
    }

    #[test]
    fn test_profile_survives_save_and_load() {
        let store = Store::in_memory().unwrap();
        let profile = sample_profile();
        store.save_profile(&profile).unwrap();

        let loaded = store.load_profile().unwrap();
        assert_eq!(loaded.history.len(), 2);
        assert_eq!(loaded.history[1].moods, vec![Mood::Happy, Mood::Adventurous]);
        assert_eq!(loaded.history[0].radius, Radius(1000));
        assert_eq!(
            loaded.history[0].timestamp.timestamp(),
            profile.history[0].timestamp.timestamp()
        );
        assert_eq!(loaded.favorite_moods(), vec![Mood::Sad, Mood::Happy]);
        assert_eq!(loaded.favorites_for(Mood::Happy)[0].name, "Le Cafe");
        assert_eq!(loaded.mood_usage, profile.mood_usage);
        assert_eq!(loaded.place_usage, profile.place_usage);
    }

    #[test]
    fn test_save_replaces_previous_profile() {
        let store = Store::in_memory().unwrap();
        let mut profile = sample_profile();
        store.save_profile(&profile).unwrap();

        profile.remove_favorite(Mood::Sad, "Jardin");
        profile.history.clear();
        store.save_profile(&profile).unwrap();

        let loaded = store.load_profile().unwrap();
        assert!(loaded.history.is_empty());
        assert_eq!(loaded.favorite_moods(), vec![Mood::Happy]);
    }

    #[test]
    fn test_failed_save_keeps_previous_profile() {
        let store = Store::in_memory().unwrap();
        store.save_profile(&sample_profile()).unwrap();

        // Two rows with the same primary key make the insert fail part-way
        let entry = HistoryEntry::new("twice", vec![Mood::Happy], Radius(500));
        let mut rows = ProfileRows::from_profile(&UserProfile::new()).unwrap();
        rows.history.push(StoredHistoryEntry::from_entry(0, &entry));
        rows.history.push(StoredHistoryEntry::from_entry(0, &entry));
        assert!(store.replace_profile_rows(rows).is_err());

        let loaded = store.load_profile().unwrap();
        assert_eq!(loaded.history.len(), 2);
        assert_eq!(loaded.history[0].input, "feeling sad");
        assert_eq!(loaded.favorite_moods(), vec![Mood::Sad, Mood::Happy]);
        assert_eq!(loaded.mood_usage, sample_profile().mood_usage);
    }

    #[test]
    fn test_clear_profile() {
        let store = Store::in_memory().unwrap();
        store.save_profile(&sample_profile()).unwrap();
        store.clear_profile().unwrap();
        assert_eq!(store.load_profile().unwrap(), UserProfile::new());
    }

    #[test]
    fn test_undecodable_favorite_is_skipped() {
        let store = Store::in_memory().unwrap();
        store.save_profile(&sample_profile()).unwrap();

        let rw = store.db.rw_transaction().unwrap();
        let mut broken: StoredFavorite = rw.get().primary(0u64).unwrap().unwrap();
        broken.tags = vec![0xff; 3];
        rw.upsert(broken).unwrap();
        rw.commit().unwrap();

        let loaded = store.load_profile().unwrap();
        assert!(loaded.favorites_for(Mood::Sad).is_empty());
        assert_eq!(loaded.favorites_for(Mood::Happy)[0].name, "Le Cafe");
    }

    #[test]
    fn test_export_json() {
        let store = Store::in_memory().unwrap();
        store.save_profile(&sample_profile()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&store.export_profile_json().unwrap()).unwrap();
        assert_eq!(json["history"][0]["input"], "feeling sad");
        assert_eq!(json["favorites"]["sad"][0]["name"], "Jardin");
    }

    #[test]
    fn test_place_cache() {
        let store = Store::in_memory().unwrap();
        let places = vec![
            place("Le Cafe", 0.5, ("amenity", "cafe")),
            place("Boulangerie", 0.7, ("shop", "bakery")),
        ];
        assert!(store.load_places(&key(Mood::Happy)).unwrap().is_none());

        store.save_places(&key(Mood::Happy), &places, 1_000).unwrap();
        let cached = store.load_places(&key(Mood::Happy)).unwrap().unwrap();
        assert_eq!(cached.places, places);
        assert_eq!(cached.key, key(Mood::Happy));
        assert_eq!(cached.age_secs(1_060), 60);

        // empty results are cached too
        store.save_places(&key(Mood::Sad), &[], 2_000).unwrap();
        assert_eq!(store.load_all_places().unwrap().len(), 2);
        assert_eq!(store.places_for_mood(Mood::Sad).unwrap().len(), 1);
        assert!(store.places_for_mood(Mood::Adventurous).unwrap().is_empty());
    }

    #[test]
    fn test_prune_and_clear_places() {
        let store = Store::in_memory().unwrap();
        store.save_places(&key(Mood::Happy), &[], 100).unwrap();
        store.save_places(&key(Mood::Sad), &[], 500).unwrap();
        store
            .save_places(&key(Mood::Adventurous), &[], 900)
            .unwrap();

        assert_eq!(store.prune_places(500).unwrap(), 1);
        assert!(store.load_places(&key(Mood::Happy)).unwrap().is_none());
        assert_eq!(store.clear_places().unwrap(), 2);
        assert!(store.load_all_places().unwrap().is_empty());
    }

    #[test]
    fn test_store_on_disk_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hangai.db");
        {
            let store = Store::open(&path).unwrap();
            store.save_profile(&sample_profile()).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.load_profile().unwrap().history.len(), 2);
    }
}
