//! HangAI Core - Domain model for the mood-based hangout recommender
//!
//! This crate holds everything that does not touch the network or disk:
//! - Mood catalog (`Mood`, `OsmTag`) mapping moods to OpenStreetMap tags
//! - Lexicon sentiment scoring and mood detection from free text
//! - Geodesic distances (`Coordinates`, `distance_km`)
//! - Places, search keys and radius parsing
//! - Overpass query building and response decoding
//! - The user profile: history, favorites and usage counters

pub mod detect;
mod error;
pub mod geo;
mod mood;
pub mod overpass;
mod place;
mod profile;
pub mod sentiment;

pub use detect::{detect_moods, parse_mood_selection, MoodSelection};
pub use error::{Error, Result};
pub use geo::{distance_km, Coordinates};
pub use mood::{Mood, OsmTag};
pub use place::{merge_closest, sort_by_distance, Place, Radius, SearchKey, DEFAULT_RADIUS_M};
pub use profile::{Favorite, HistoryEntry, UserProfile, MAX_HISTORY};
