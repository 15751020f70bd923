//! Places, search radius and cache keys

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::mood::Mood;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Default search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 2500;

/// A place returned by a nearby search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coords: Coordinates,
    /// Distance from the search origin in kilometers
    pub distance_km: f64,
    /// Raw OpenStreetMap tags
    pub tags: BTreeMap<String, String>,
}

impl Place {
    /// Check whether this place qualifies for a mood
    pub fn matches(&self, mood: Mood) -> bool {
        mood.matches_tags(&self.tags)
    }

    /// Distinct tag values, sorted, for display
    pub fn tag_values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self.tags.values().map(String::as_str).collect();
        values.sort_unstable();
        values.dedup();
        values
    }
}

/// Sort places by ascending distance, keeping the order of ties
pub fn sort_by_distance(places: &mut [Place]) {
    places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
}

/// Deduplicate places by name, keeping the closest one, sorted by distance
pub fn merge_closest(places: impl IntoIterator<Item = Place>) -> Vec<Place> {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Place> = Vec::new();

    for place in places {
        match by_name.get(&place.name) {
            Some(&idx) => {
                if place.distance_km < merged[idx].distance_km {
                    merged[idx] = place;
                }
            }
            None => {
                by_name.insert(place.name.clone(), merged.len());
                merged.push(place);
            }
        }
    }

    sort_by_distance(&mut merged);
    merged
}

/// Search radius in meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radius(pub u32);

impl Radius {
    pub fn meters(&self) -> u32 {
        self.0
    }

    pub fn km(&self) -> f64 {
        f64::from(self.0) / 1000.0
    }

    /// Parse a kilometer value typed by the user
    ///
    /// Blank, unparsable or non-positive input yields `default`. Meters are
    /// truncated to a whole number.
    pub fn from_km_input(input: &str, default: Radius) -> Radius {
        let input = input.trim();
        if input.is_empty() {
            return default;
        }
        match input.parse::<f64>() {
            Ok(km) if km.is_finite() && km > 0.0 => {
                let meters = (km * 1000.0).trunc();
                if meters >= 1.0 && meters <= f64::from(u32::MAX) {
                    Radius(meters as u32)
                } else {
                    default
                }
            }
            _ => default,
        }
    }
}

impl Default for Radius {
    fn default() -> Self {
        Radius(DEFAULT_RADIUS_M)
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} km", self.km())
    }
}

/// Cache key for one nearby search
///
/// Coordinates are rounded to four decimals (about 11 m) so that repeated
/// searches from the same spot share results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchKey {
    pub lat_e4: i64,
    pub lon_e4: i64,
    pub mood: Mood,
    pub radius_m: u32,
}

impl SearchKey {
    pub fn new(coords: Coordinates, mood: Mood, radius: Radius) -> Self {
        Self {
            lat_e4: (coords.lat * 10_000.0).round() as i64,
            lon_e4: (coords.lon * 10_000.0).round() as i64,
            mood,
            radius_m: radius.meters(),
        }
    }

    /// Rounded search origin
    pub fn origin(&self) -> Coordinates {
        Coordinates {
            lat: self.lat_e4 as f64 / 10_000.0,
            lon: self.lon_e4 as f64 / 10_000.0,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

fn format_e4(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{}{}.{:04}", sign, abs / 10_000, abs % 10_000)
}

fn parse_e4(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = digits.split_once('.')?;
    if frac.len() != 4 || whole.is_empty() {
        return None;
    }
    let value = whole.parse::<i64>().ok()? * 10_000 + frac.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            format_e4(self.lat_e4),
            format_e4(self.lon_e4),
            self.mood,
            self.radius_m
        )
    }
}

impl FromStr for SearchKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSearchKey(s.to_string());
        let parts: Vec<&str> = s.split(',').collect();
        let [lat, lon, mood, radius] = parts.as_slice() else {
            return Err(invalid());
        };
        Ok(Self {
            lat_e4: parse_e4(lat).ok_or_else(invalid)?,
            lon_e4: parse_e4(lon).ok_or_else(invalid)?,
            mood: mood.parse().map_err(|_| invalid())?,
            radius_m: radius.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, distance_km: f64, tags: &[(&str, &str)]) -> Place {
        Place {
            name: name.to_string(),
            coords: Coordinates { lat: 0.0, lon: 0.0 },
            distance_km,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_merge_keeps_closest_duplicate() {
        let merged = merge_closest(vec![
            place("Cafe A", 1.2, &[]),
            place("Park", 0.4, &[]),
            place("Cafe A", 0.9, &[("amenity", "cafe")]),
            place("Library", 2.0, &[]),
        ]);

        let names: Vec<&str> = merged.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Park", "Cafe A", "Library"]);
        assert_eq!(merged[1].distance_km, 0.9);
        assert!(merged[1].matches(Mood::Happy));
    }

    #[test]
    fn test_merge_collapses_unnamed() {
        let merged = merge_closest(vec![place("Unnamed", 0.3, &[]), place("Unnamed", 0.1, &[])]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].distance_km, 0.1);
    }

    #[test]
    fn test_tag_values() {
        let p = place(
            "Mix",
            0.0,
            &[("amenity", "cafe"), ("cuisine", "cafe"), ("bar", "yes")],
        );
        assert_eq!(p.tag_values(), vec!["cafe", "yes"]);
    }

    #[test]
    fn test_radius_from_km_input() {
        let default = Radius::default();
        assert_eq!(Radius::from_km_input("", default), Radius(2500));
        assert_eq!(Radius::from_km_input("1.5", default), Radius(1500));
        assert_eq!(Radius::from_km_input(" 0.0009 ", default), default);
        assert_eq!(Radius::from_km_input("-2", default), default);
        assert_eq!(Radius::from_km_input("far", default), default);
        assert_eq!(Radius::from_km_input("3.14159", default), Radius(3141));
        assert_eq!(format!("{}", Radius(2500)), "2.50 km");
    }

    #[test]
    fn test_search_key_rounding() {
        let a = SearchKey::new(
            Coordinates { lat: 40.712_81, lon: -74.006_02 },
            Mood::Sad,
            Radius(2500),
        );
        let b = SearchKey::new(
            Coordinates { lat: 40.712_84, lon: -74.005_98 },
            Mood::Sad,
            Radius(2500),
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "40.7128,-74.0060,sad,2500");
    }

    #[test]
    fn test_search_key_parse() {
        let key: SearchKey = "-0.0005,151.2093,adventurous,1000".parse().unwrap();
        assert_eq!(key.lat_e4, -5);
        assert_eq!(key.lon_e4, 1_512_093);
        assert_eq!(key.mood, Mood::Adventurous);
        assert_eq!(key.to_string(), "-0.0005,151.2093,adventurous,1000");

        assert!(SearchKey::parse("1.0,2.0,happy,10").is_err());
        assert!(SearchKey::parse("1.0000,2.0000,grumpy,10").is_err());
        assert!(SearchKey::parse("1.0000,2.0000,happy").is_err());
    }
}
