//! Cached place search models for database storage.

use hangai_core::Place;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored result of one nearby search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 10, version = 1)]
#[native_db]
pub struct StoredPlaces {
    /// Primary key - the search key (`lat,lon,mood,radius`).
    #[primary_key]
    pub key: String,
    /// Searched mood.
    #[secondary_key]
    pub mood: String,
    /// Serialized places.
    pub places: Vec<u8>,
    /// Unix timestamp of the fetch.
    pub fetched_at: i64,
}

impl StoredPlaces {
    /// Create from a list of places.
    pub fn from_places(
        key: String,
        mood: &str,
        places: &[Place],
        fetched_at: i64,
    ) -> bincode::Result<Self> {
        let places = bincode::serialize(places)?;
        Ok(Self {
            key,
            mood: mood.to_string(),
            places,
            fetched_at,
        })
    }

    /// Decode the stored places.
    pub fn to_places(&self) -> bincode::Result<Vec<Place>> {
        bincode::deserialize(&self.places)
    }
}
