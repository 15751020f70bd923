//! Overpass QL query building and response decoding
//!
//! The client in the application sends the query produced here; this module
//! only deals with text and JSON so it can be tested without a network.

use crate::error::{Error, Result};
use crate::geo::{distance_km, Coordinates};
use crate::mood::Mood;
use crate::place::{sort_by_distance, Place, Radius};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Name used for elements without a `name` tag
pub const UNNAMED: &str = "Unnamed";

/// Build the Overpass QL query for one mood around a point
///
/// Nodes and ways are both requested; `out center` gives ways a centroid.
pub fn build_query(origin: Coordinates, mood: Mood, radius: Radius) -> String {
    let around = format!("(around:{},{},{})", radius.meters(), origin.lat, origin.lon);
    let mut query = String::from("[out:json];(");
    for tag in mood.tags() {
        query.push_str(&format!("node['{}'='{}']{};", tag.key, tag.value, around));
        query.push_str(&format!("way['{}'='{}']{};", tag.key, tag.value, around));
    }
    query.push_str(");out center;");
    query
}

/// Top-level Overpass JSON response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A node, way or relation in an Overpass response
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Centroid emitted for ways by `out center`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    /// Position of the element, preferring its own coordinates over the center
    pub fn position(&self) -> Option<Coordinates> {
        let (lat, lon) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        Coordinates::new(lat, lon).ok()
    }

    pub fn name(&self) -> &str {
        self.tags.get("name").map(String::as_str).unwrap_or(UNNAMED)
    }
}

/// Decode a raw Overpass JSON body
pub fn parse_response(body: &str) -> Result<OverpassResponse> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

/// Turn response elements into places sorted by distance from `origin`
///
/// Elements without usable coordinates are dropped.
pub fn places_from_response(response: OverpassResponse, origin: Coordinates) -> Vec<Place> {
    let mut places: Vec<Place> = response
        .elements
        .into_iter()
        .filter_map(|element| {
            let coords = element.position()?;
            Some(Place {
                name: element.name().to_string(),
                coords,
                distance_km: distance_km(origin, coords),
                tags: element.tags,
            })
        })
        .collect();
    sort_by_distance(&mut places);
    places
}
