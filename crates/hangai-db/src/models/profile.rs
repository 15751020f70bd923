//! Profile models for database storage.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use hangai_core::{Favorite, HistoryEntry, Mood, Radius};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Usage counter kind for moods.
pub const USAGE_MOOD: &str = "mood";
/// Usage counter kind for places.
pub const USAGE_PLACE: &str = "place";

/// Stored search history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredHistoryEntry {
    /// Primary key - position in the history.
    #[primary_key]
    pub seq: u64,
    /// Mood description typed by the user.
    pub input: String,
    /// Searched moods.
    pub moods: Vec<String>,
    /// Search radius in meters.
    pub radius_m: u32,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl StoredHistoryEntry {
    /// Create from a history entry.
    pub fn from_entry(seq: u64, entry: &HistoryEntry) -> Self {
        Self {
            seq,
            input: entry.input.clone(),
            moods: entry.moods.iter().map(|m| m.as_str().to_string()).collect(),
            radius_m: entry.radius.meters(),
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }

    /// Convert to a history entry, `None` if a field no longer decodes.
    pub fn to_entry(&self) -> Option<HistoryEntry> {
        let moods = self
            .moods
            .iter()
            .map(|m| m.parse::<Mood>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .ok()?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()?
            .with_timezone(&Local);
        Some(HistoryEntry {
            input: self.input.clone(),
            moods,
            radius: Radius(self.radius_m),
            timestamp,
        })
    }
}

/// Stored favorite place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredFavorite {
    /// Primary key - position across all favorites.
    #[primary_key]
    pub id: u64,
    /// Mood the favorite belongs to.
    #[secondary_key]
    pub mood: String,
    /// Place name.
    pub name: String,
    /// Serialized OpenStreetMap tags.
    pub tags: Vec<u8>,
}

impl StoredFavorite {
    /// Create from a favorite.
    pub fn from_favorite(id: u64, mood: Mood, favorite: &Favorite) -> Result<Self> {
        let tags = bincode::serialize(&favorite.tags)?;
        Ok(Self {
            id,
            mood: mood.as_str().to_string(),
            name: favorite.name.clone(),
            tags,
        })
    }

    /// Convert to a mood and favorite.
    pub fn to_favorite(&self) -> Result<(Mood, Favorite)> {
        let mood = self.mood.parse().map_err(|_| Error::Corrupt {
            key: format!("favorite:{}", self.id),
            reason: format!("unknown mood {:?}", self.mood),
        })?;
        let tags = bincode::deserialize(&self.tags)?;
        Ok((
            mood,
            Favorite {
                name: self.name.clone(),
                tags,
            },
        ))
    }
}

/// Stored usage counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredUsage {
    /// Primary key - `kind:name`.
    #[primary_key]
    pub key: String,
    /// Counter kind (`mood` or `place`).
    #[secondary_key]
    pub kind: String,
    /// Mood or place name.
    pub name: String,
    /// Use count.
    pub count: u64,
    /// Insertion order within its kind.
    pub position: u64,
}

impl StoredUsage {
    /// Create a usage counter row.
    pub fn new(kind: &str, name: &str, count: u64, position: u64) -> Self {
        Self {
            key: format!("{kind}:{name}"),
            kind: kind.to_string(),
            name: name.to_string(),
            count,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn favorite() -> Favorite {
        Favorite {
            name: "Le Cafe".to_string(),
            tags: BTreeMap::from([("amenity".to_string(), "cafe".to_string())]),
        }
    }

    #[test]
    fn test_favorite_keeps_tags() {
        let stored = StoredFavorite::from_favorite(4, Mood::Happy, &favorite()).unwrap();
        let (mood, restored) = stored.to_favorite().unwrap();
        assert_eq!(mood, Mood::Happy);
        assert_eq!(restored, favorite());
    }

    #[test]
    fn test_undecodable_tags_are_an_error() {
        let mut stored = StoredFavorite::from_favorite(0, Mood::Sad, &favorite()).unwrap();
        stored.tags = vec![0xff; 3];
        assert!(matches!(stored.to_favorite(), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_unknown_mood_is_corrupt() {
        let mut stored = StoredFavorite::from_favorite(7, Mood::Sad, &favorite()).unwrap();
        stored.mood = "grumpy".to_string();
        match stored.to_favorite() {
            Err(Error::Corrupt { key, .. }) => assert_eq!(key, "favorite:7"),
            other => panic!("expected corrupt record, got {other:?}"),
        }
    }
}
