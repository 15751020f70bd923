//! Mood catalog
//!
//! Each mood maps to a fixed set of OpenStreetMap tags plus the display
//! attributes used by the table and the map.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single OpenStreetMap `key=value` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsmTag {
    pub key: &'static str,
    pub value: &'static str,
}

impl OsmTag {
    const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }
}

impl fmt::Display for OsmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

const HAPPY_TAGS: &[OsmTag] = &[
    OsmTag::new("amenity", "cafe"),
    OsmTag::new("amenity", "restaurant"),
    OsmTag::new("bar", "yes"),
    OsmTag::new("shop", "bakery"),
];

const SAD_TAGS: &[OsmTag] = &[
    OsmTag::new("leisure", "park"),
    OsmTag::new("amenity", "library"),
    OsmTag::new("place_of_worship", "church"),
];

const ADVENTUROUS_TAGS: &[OsmTag] = &[
    OsmTag::new("leisure", "amusement_park"),
    OsmTag::new("sport", "climbing"),
    OsmTag::new("leisure", "sports_centre"),
];

/// The moods HangAI knows how to recommend for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Adventurous,
}

impl Mood {
    /// All moods in catalog order
    pub const ALL: [Mood; 3] = [Mood::Happy, Mood::Sad, Mood::Adventurous];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Adventurous => "adventurous",
        }
    }

    /// Capitalized name for headings and layer titles
    pub fn title(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Adventurous => "Adventurous",
        }
    }

    /// OpenStreetMap tags that qualify a place for this mood
    pub fn tags(&self) -> &'static [OsmTag] {
        match self {
            Mood::Happy => HAPPY_TAGS,
            Mood::Sad => SAD_TAGS,
            Mood::Adventurous => ADVENTUROUS_TAGS,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😔",
            Mood::Adventurous => "🧗",
        }
    }

    /// Marker and polyline colour on the map
    pub fn color(&self) -> &'static str {
        match self {
            Mood::Happy => "lightgreen",
            Mood::Sad => "blue",
            Mood::Adventurous => "orange",
        }
    }

    /// Font Awesome icon name for map markers
    pub fn marker_icon(&self) -> &'static str {
        match self {
            Mood::Happy => "coffee",
            Mood::Sad => "leaf",
            Mood::Adventurous => "flag",
        }
    }

    /// SVG dash array for the polylines drawn to the closest places
    pub fn dash_pattern(&self) -> &'static str {
        match self {
            Mood::Happy => "5,5",
            Mood::Sad => "1,5",
            Mood::Adventurous => "10,5",
        }
    }

    /// Check whether a place's tag map carries any of this mood's tags
    pub fn matches_tags(&self, tags: &BTreeMap<String, String>) -> bool {
        self.tags()
            .iter()
            .any(|tag| tags.get(tag.key).map(String::as_str) == Some(tag.value))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == lowered)
            .ok_or_else(|| Error::UnknownMood(s.to_string()))
    }
}
