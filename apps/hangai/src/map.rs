//! Interactive HTML map of a search
//!
//! The page loads Leaflet, Leaflet.markercluster and Leaflet.awesome-markers
//! from a CDN. Everything specific to the search is embedded as one JSON
//! object, so place names never reach the page as raw script text.

use hangai_core::{Coordinates, Mood, Place, Radius, UserProfile};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Initial zoom level
pub const ZOOM: u8 = 14;

/// Everything needed to draw one search result
pub struct MapView<'a> {
    pub origin: Coordinates,
    pub radius: Radius,
    pub moods: &'a [Mood],
    pub places: &'a [Place],
    /// Used to highlight favorites
    pub profile: &'a UserProfile,
    /// Closest places per mood connected to the user with a line
    pub polylines_per_mood: usize,
}

#[derive(Serialize)]
struct MapData {
    center: [f64; 2],
    zoom: u8,
    radius_m: u32,
    radius_popup: String,
    layers: Vec<MoodLayer>,
}

#[derive(Serialize)]
struct MoodLayer {
    title: String,
    color: &'static str,
    dash: &'static str,
    markers: Vec<MarkerData>,
    lines: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct MarkerData {
    position: [f64; 2],
    icon: &'static str,
    popup: String,
}

/// Escape text for use inside HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn popup_text(mood: Mood, place: &Place, favorite: bool) -> String {
    let mut text = format!(
        "{} <b>{}</b><br>Distance: {:.2} km",
        mood.emoji(),
        escape_html(&place.name),
        place.distance_km
    );
    if favorite {
        text.push_str("<br>★ Favorite");
    }
    text
}

fn mood_layer(view: &MapView<'_>, mood: Mood) -> MoodLayer {
    let matching: Vec<&Place> = view.places.iter().filter(|p| p.matches(mood)).collect();

    let markers = matching
        .iter()
        .map(|place| {
            let favorite = view.profile.is_favorite(mood, &place.name);
            MarkerData {
                position: [place.coords.lat, place.coords.lon],
                icon: if favorite { "star" } else { mood.marker_icon() },
                popup: popup_text(mood, place, favorite),
            }
        })
        .collect();

    let lines = matching
        .iter()
        .take(view.polylines_per_mood)
        .map(|place| [place.coords.lat, place.coords.lon])
        .collect();

    MoodLayer {
        title: format!("{} {}", mood.title(), mood.emoji()),
        color: mood.color(),
        dash: mood.dash_pattern(),
        markers,
        lines,
    }
}

/// JSON for embedding in a `<script>` element
fn script_json(data: &MapData) -> String {
    // serializing plain structs of strings and numbers cannot fail
    let json = serde_json::to_string(data).unwrap_or_else(|_| "null".to_string());
    json.replace("</", "<\\/")
}

/// Render a complete, self-contained HTML page
pub fn render_map(view: &MapView<'_>) -> String {
    let data = MapData {
        center: [view.origin.lat, view.origin.lon],
        zoom: ZOOM,
        radius_m: view.radius.meters(),
        radius_popup: format!("Search radius: {:.2} km", view.radius.km()),
        layers: view.moods.iter().map(|&mood| mood_layer(view, mood)).collect(),
    };

    PAGE_TEMPLATE.replace("__HANGAI_DATA__", &script_json(&data))
}

/// Write a rendered page to disk
pub fn write_map(path: impl AsRef<Path>, html: &str) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, html)?;
    info!(path = %path.display(), bytes = html.len(), "map written");
    Ok(())
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>HangAI</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.min.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
const data = __HANGAI_DATA__;
const map = L.map("map").setView(data.center, data.zoom);
L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors"
}).addTo(map);

const icon = (color, name) => L.AwesomeMarkers.icon({ markerColor: color, icon: name, prefix: "fa" });

L.marker(data.center, { icon: icon("red", "user") }).bindPopup("You are here").addTo(map);
L.circle(data.center, {
  radius: data.radius_m, color: "purple", fill: true, fillOpacity: 0.1
}).bindPopup(data.radius_popup).addTo(map);

const overlays = {};
for (const layer of data.layers) {
  const cluster = L.markerClusterGroup();
  for (const m of layer.markers) {
    L.marker(m.position, { icon: icon(layer.color, m.icon) })
      .bindPopup(m.popup, { maxWidth: 300 })
      .addTo(cluster);
  }
  cluster.addTo(map);
  overlays[layer.title] = cluster;
  for (const target of layer.lines) {
    L.polyline([data.center, target], {
      color: layer.color, weight: 3, dashArray: layer.dash
    }).addTo(map);
  }
}
L.control.layers(null, overlays, { collapsed: false }).addTo(map);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use hangai_core::{Favorite, HistoryEntry};
    use std::collections::BTreeMap;

    fn place(name: &str, lat: f64, distance_km: f64, tags: &[(&str, &str)]) -> Place {
        Place {
            name: name.to_string(),
            coords: Coordinates { lat, lon: 2.35 },
            distance_km,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn places() -> Vec<Place> {
        vec![
            place("Café <Flore>", 48.854, 0.31, &[("amenity", "cafe")]),
            place("Parc A", 48.855, 0.5, &[("leisure", "park")]),
            place("Parc B", 48.856, 0.7, &[("leisure", "park")]),
            place("Parc C", 48.857, 0.9, &[("leisure", "park")]),
            place("Parc D", 48.858, 1.2, &[("leisure", "park")]),
        ]
    }

    fn render(moods: &[Mood], profile: &UserProfile) -> String {
        let places = places();
        render_map(&MapView {
            origin: Coordinates { lat: 48.8566, lon: 2.3522 },
            radius: Radius(1500),
            moods,
            places: &places,
            profile,
            polylines_per_mood: 3,
        })
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_page_contents() {
        let html = render(&[Mood::Happy, Mood::Sad], &UserProfile::new());
        assert!(html.contains("You are here"));
        assert!(html.contains("Search radius: 1.50 km"));
        assert!(html.contains("\"zoom\":14"));
        assert!(html.contains("Happy 😊"));
        assert!(html.contains("Sad 😔"));
        assert!(html.contains("collapsed: false"));
        assert!(!html.contains("__HANGAI_DATA__"));
    }

    #[test]
    fn test_layers_and_lines() {
        let places = places();
        let profile = UserProfile::new();
        let view = MapView {
            origin: Coordinates { lat: 48.8566, lon: 2.3522 },
            radius: Radius(1500),
            moods: &[Mood::Sad],
            places: &places,
            profile: &profile,
            polylines_per_mood: 3,
        };
        let layer = mood_layer(&view, Mood::Sad);
        assert_eq!(layer.markers.len(), 4);
        assert_eq!(layer.lines.len(), 3);
        assert_eq!(layer.color, "blue");
        assert_eq!(layer.dash, "1,5");
        assert!(layer.markers.iter().all(|m| m.icon == "leaf"));
    }

    #[test]
    fn test_names_are_escaped_in_popups() {
        let html = render(&[Mood::Happy], &UserProfile::new());
        assert!(html.contains("Café &lt;Flore&gt;"));
        assert!(!html.contains("<Flore>"));
        assert!(html.contains("Distance: 0.31 km"));
    }

    #[test]
    fn test_favorites_get_star() {
        let mut profile = UserProfile::new();
        profile.favorites.insert(
            Mood::Sad,
            vec![Favorite {
                name: "Parc B".to_string(),
                tags: BTreeMap::new(),
            }],
        );
        profile.record_search(HistoryEntry::new("meh", vec![Mood::Sad], Radius(1500)), 50);

        let places = places();
        let view = MapView {
            origin: Coordinates { lat: 48.8566, lon: 2.3522 },
            radius: Radius(1500),
            moods: &[Mood::Sad],
            places: &places,
            profile: &profile,
            polylines_per_mood: 3,
        };
        let layer = mood_layer(&view, Mood::Sad);
        let starred: Vec<&MarkerData> = layer.markers.iter().filter(|m| m.icon == "star").collect();
        assert_eq!(starred.len(), 1);
        assert!(starred[0].popup.contains("★ Favorite"));
    }

    #[test]
    fn test_script_close_tag_is_escaped() {
        let data = MapData {
            center: [0.0, 0.0],
            zoom: ZOOM,
            radius_m: 100,
            radius_popup: "</script><script>alert(1)".to_string(),
            layers: Vec::new(),
        };
        assert!(!script_json(&data).contains("</script>"));
    }

    #[test]
    fn test_write_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        let html = render(&[Mood::Adventurous], &UserProfile::new());
        write_map(&path, &html).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), html);
    }
}
