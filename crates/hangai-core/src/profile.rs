//! User profile: search history, favorites and usage counters

use crate::mood::Mood;
use crate::place::{Place, Radius};
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of history entries kept
pub const MAX_HISTORY: usize = 50;

/// One recorded search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The mood description the user typed
    pub input: String,
    /// Moods that were searched
    pub moods: Vec<Mood>,
    pub radius: Radius,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(input: impl Into<String>, moods: Vec<Mood>, radius: Radius) -> Self {
        Self {
            input: input.into(),
            moods,
            radius,
            timestamp: Local::now(),
        }
    }

    /// Moods joined for display, e.g. `happy, sad`
    pub fn moods_label(&self) -> String {
        self.moods
            .iter()
            .map(Mood::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A remembered place for a mood
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
    pub tags: BTreeMap<String, String>,
}

impl From<&Place> for Favorite {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            tags: place.tags.clone(),
        }
    }
}

/// Everything HangAI remembers about its user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub history: Vec<HistoryEntry>,
    pub favorites: IndexMap<Mood, Vec<Favorite>>,
    pub mood_usage: IndexMap<Mood, u64>,
    pub place_usage: IndexMap<String, u64>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search, keeping only the newest `max` entries
    pub fn record_search(&mut self, entry: HistoryEntry, max: usize) {
        self.history.push(entry);
        if self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.drain(..excess);
        }
    }

    /// Remember the closest new matching place for each mood
    ///
    /// For every mood, the first place in `places` that matches the mood and
    /// is not yet a favorite for it is added, and both usage counters are
    /// bumped. Returns the `(mood, place name)` pairs that were added.
    pub fn remember_favorites(&mut self, moods: &[Mood], places: &[Place]) -> Vec<(Mood, String)> {
        let mut added = Vec::new();
        for &mood in moods {
            let list = self.favorites.entry(mood).or_default();
            let candidate = places
                .iter()
                .filter(|p| p.matches(mood))
                .find(|p| !list.iter().any(|fav| fav.name == p.name));

            if let Some(place) = candidate {
                list.push(Favorite::from(place));
                added.push((mood, place.name.clone()));
            }
        }

        self.favorites.retain(|_, list| !list.is_empty());
        for (mood, name) in &added {
            self.bump_usage(*mood, name);
        }
        added
    }

    fn bump_usage(&mut self, mood: Mood, place_name: &str) {
        *self.mood_usage.entry(mood).or_insert(0) += 1;
        *self
            .place_usage
            .entry(place_name.to_string())
            .or_insert(0) += 1;
    }

    /// Remove a favorite; returns whether anything was removed
    pub fn remove_favorite(&mut self, mood: Mood, name: &str) -> bool {
        let Some(list) = self.favorites.get_mut(&mood) else {
            return false;
        };
        let before = list.len();
        list.retain(|fav| fav.name != name);
        let removed = list.len() != before;
        if list.is_empty() {
            self.favorites.shift_remove(&mood);
        }
        removed
    }

    pub fn is_favorite(&self, mood: Mood, name: &str) -> bool {
        self.favorites
            .get(&mood)
            .is_some_and(|list| list.iter().any(|fav| fav.name == name))
    }

    /// Check whether a place is a favorite for any mood
    pub fn is_favorite_any(&self, name: &str) -> bool {
        self.favorites
            .values()
            .any(|list| list.iter().any(|fav| fav.name == name))
    }

    /// Moods that have at least one favorite, in insertion order
    pub fn favorite_moods(&self) -> Vec<Mood> {
        self.favorites
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(mood, _)| *mood)
            .collect()
    }

    pub fn favorites_for(&self, mood: Mood) -> &[Favorite] {
        self.favorites.get(&mood).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most used moods, highest count first, ties by name
    pub fn top_moods(&self, n: usize) -> Vec<(Mood, u64)> {
        let mut usage: Vec<(Mood, u64)> = self.mood_usage.iter().map(|(m, c)| (*m, *c)).collect();
        usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        usage.truncate(n);
        usage
    }

    /// Most used places, highest count first, ties by name
    pub fn top_places(&self, n: usize) -> Vec<(String, u64)> {
        let mut usage: Vec<(String, u64)> = self
            .place_usage
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        usage.truncate(n);
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn place(name: &str, distance_km: f64, tag: (&str, &str)) -> Place {
        Place {
            name: name.to_string(),
            coords: Coordinates { lat: 0.0, lon: 0.0 },
            distance_km,
            tags: BTreeMap::from([(tag.0.to_string(), tag.1.to_string())]),
        }
    }

    fn sample_places() -> Vec<Place> {
        vec![
            place("Corner Cafe", 0.2, ("amenity", "cafe")),
            place("City Park", 0.4, ("leisure", "park")),
            place("Bakery", 0.6, ("shop", "bakery")),
        ]
    }

    #[test]
    fn test_history_is_capped() {
        let mut profile = UserProfile::new();
        for i in 0..55 {
            profile.record_search(
                HistoryEntry::new(format!("search {i}"), vec![Mood::Happy], Radius::default()),
                MAX_HISTORY,
            );
        }
        assert_eq!(profile.history.len(), MAX_HISTORY);
        assert_eq!(profile.history[0].input, "search 5");
        assert_eq!(profile.history[49].input, "search 54");
    }

    #[test]
    fn test_remember_one_favorite_per_mood() {
        let mut profile = UserProfile::new();
        let places = sample_places();

        let added = profile.remember_favorites(&[Mood::Happy, Mood::Sad], &places);
        assert_eq!(
            added,
            vec![
                (Mood::Happy, "Corner Cafe".to_string()),
                (Mood::Sad, "City Park".to_string())
            ]
        );
        assert_eq!(profile.mood_usage[&Mood::Happy], 1);
        assert_eq!(profile.place_usage["City Park"], 1);

        // the next search skips existing favorites
        let added = profile.remember_favorites(&[Mood::Happy, Mood::Sad], &places);
        assert_eq!(added, vec![(Mood::Happy, "Bakery".to_string())]);
        assert_eq!(profile.favorites_for(Mood::Happy).len(), 2);
        assert_eq!(profile.mood_usage[&Mood::Happy], 2);
        assert_eq!(profile.mood_usage[&Mood::Sad], 1);
    }

    #[test]
    fn test_remember_without_match_leaves_no_empty_list() {
        let mut profile = UserProfile::new();
        let added = profile.remember_favorites(&[Mood::Adventurous], &sample_places());
        assert!(added.is_empty());
        assert!(profile.favorites.is_empty());
        assert!(profile.favorite_moods().is_empty());
    }

    #[test]
    fn test_remove_favorite() {
        let mut profile = UserProfile::new();
        profile.remember_favorites(&[Mood::Sad, Mood::Happy], &sample_places());
        assert!(profile.is_favorite(Mood::Sad, "City Park"));
        assert!(profile.is_favorite_any("Corner Cafe"));
        assert_eq!(profile.favorite_moods(), vec![Mood::Sad, Mood::Happy]);

        assert!(profile.remove_favorite(Mood::Sad, "City Park"));
        assert!(!profile.remove_favorite(Mood::Sad, "City Park"));
        assert!(!profile.remove_favorite(Mood::Happy, "Nope"));
        assert_eq!(profile.favorite_moods(), vec![Mood::Happy]);
        assert!(!profile.is_favorite_any("City Park"));
    }

    #[test]
    fn test_top_usage() {
        let mut profile = UserProfile::new();
        profile.mood_usage.insert(Mood::Sad, 3);
        profile.mood_usage.insert(Mood::Happy, 3);
        profile.mood_usage.insert(Mood::Adventurous, 7);
        profile.place_usage.insert("b".to_string(), 1);
        profile.place_usage.insert("a".to_string(), 1);
        profile.place_usage.insert("c".to_string(), 4);

        assert_eq!(
            profile.top_moods(2),
            vec![(Mood::Adventurous, 7), (Mood::Happy, 3)]
        );
        assert_eq!(
            profile.top_places(5),
            vec![("c".to_string(), 4), ("a".to_string(), 1), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_moods_ties_sort_by_name() {
        let mut profile = UserProfile::new();
        profile.mood_usage.insert(Mood::Happy, 3);
        profile.mood_usage.insert(Mood::Sad, 3);
        profile.mood_usage.insert(Mood::Adventurous, 3);

        assert_eq!(
            profile.top_moods(3),
            vec![(Mood::Adventurous, 3), (Mood::Happy, 3), (Mood::Sad, 3)]
        );
    }

    #[test]
    fn test_profile_json_shape() {
        let mut profile = UserProfile::new();
        profile.remember_favorites(&[Mood::Happy], &sample_places());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["favorites"]["happy"][0]["name"], "Corner Cafe");
        assert_eq!(json["mood_usage"]["happy"], 1);
    }
}
