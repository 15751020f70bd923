//! Interactive menu session

use crate::config::SearchConfig;
use crate::console::{self, Prompt};
use crate::error::Result;
use crate::geocode::Locator;
use crate::map::{render_map, write_map, MapView};
use crate::overpass::PlaceSource;
use crate::recommend::Recommender;
use crate::table::print_table;
use crossterm::style::Color;
use hangai_core::{
    detect_moods, parse_mood_selection, Coordinates, HistoryEntry, Mood, Place, Radius,
    UserProfile,
};
use hangai_db::Store;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const NO_PLACES_HINT: &str = "No places found. Try increasing radius or selecting different moods.";

/// Whether the menu loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ended
    Quit,
}

/// `happy 😊, sad 😔`
fn moods_with_emoji(moods: &[Mood]) -> String {
    moods
        .iter()
        .map(|m| format!("{} {}", m.as_str(), m.emoji()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print the search history, numbered from 1
pub fn print_history<W: Write>(out: &mut W, profile: &UserProfile) -> io::Result<()> {
    if profile.history.is_empty() {
        return console::warn(out, "No history yet.");
    }
    console::heading(out, Color::Reset, "Search History:")?;
    for (idx, entry) in profile.history.iter().enumerate() {
        console::plain(
            out,
            &format!(
                "{}. [{}] Moods: {} - Input: {}",
                idx + 1,
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.moods_label(),
                entry.input
            ),
        )?;
    }
    Ok(())
}

/// Console session over a geocoder, a place source, a prompt and an output
pub struct Session<L, S, P, W> {
    locator: L,
    recommender: Recommender<S>,
    store: Arc<Store>,
    search: SearchConfig,
    map_path: PathBuf,
    prompt: P,
    out: W,
    profile: UserProfile,
}

impl<L, S, P, W> Session<L, S, P, W>
where
    L: Locator,
    S: PlaceSource,
    P: Prompt,
    W: Write,
{
    /// Create a session, loading the saved profile from `store`
    pub fn new(
        locator: L,
        recommender: Recommender<S>,
        store: Arc<Store>,
        search: SearchConfig,
        map_path: PathBuf,
        prompt: P,
        out: W,
    ) -> Result<Self> {
        let profile = store.load_profile()?;
        debug!(
            history = profile.history.len(),
            favorite_moods = profile.favorites.len(),
            "profile loaded"
        );
        Ok(Self {
            locator,
            recommender,
            store,
            search,
            map_path,
            prompt,
            out,
            profile,
        })
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn recommender(&self) -> &Recommender<S> {
        &self.recommender
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self.prompt.read_line(prompt)?)
    }

    fn save(&self) -> Result<()> {
        self.store.save_profile(&self.profile)?;
        debug!("profile saved");
        Ok(())
    }

    /// Run the menu loop until the user exits or input ends
    ///
    /// `location` is tried first; the user is asked again when it cannot
    /// be geocoded.
    pub async fn run(&mut self, location: Option<&str>) -> Result<()> {
        console::heading(
            &mut self.out,
            Color::Magenta,
            "🌍 Welcome to HangAI — Mood-Based Hangout Recommender!",
        )?;

        let initial = match location {
            Some(address) => match self.locator.locate(address).await {
                Ok(coords) => Some(coords),
                Err(e) => {
                    console::error(&mut self.out, &e.to_string())?;
                    None
                }
            },
            None => None,
        };
        let origin = match initial {
            Some(coords) => coords,
            None => match self.ask_location().await? {
                Some(coords) => coords,
                None => return self.finish(),
            },
        };

        loop {
            console::heading(&mut self.out, Color::Cyan, "\nOptions:")?;
            for line in [
                "1️⃣ Get Recommendations",
                "2️⃣ View History",
                "3️⃣ Manage Favorites",
                "4️⃣ Usage Stats",
                "5️⃣ Exit",
            ] {
                console::plain(&mut self.out, line)?;
            }

            let Some(choice) = self.ask("Choose (1/2/3/4/5): ")? else {
                break;
            };
            let flow = match choice.trim() {
                "1" => self.recommendation_flow(origin).await?,
                "2" => self.history_flow(origin).await?,
                "3" => self.favorites_flow().await?,
                "4" => {
                    self.stats_flow().await?;
                    Flow::Continue
                }
                "5" => break,
                _ => {
                    console::error(
                        &mut self.out,
                        "Invalid input. Please select 1, 2, 3, 4, or 5.",
                    )?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }

        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        self.save()?;
        console::success(&mut self.out, "Goodbye! Enjoy your hangouts! 👋")?;
        Ok(())
    }

    /// Ask for a location until it geocodes; `None` when input ends
    async fn ask_location(&mut self) -> Result<Option<Coordinates>> {
        loop {
            let Some(address) = self.ask("Enter your location (address or city): ")? else {
                return Ok(None);
            };
            match self.locator.locate(&address).await {
                Ok(coords) => return Ok(Some(coords)),
                Err(e) => console::error(&mut self.out, &e.to_string())?,
            }
        }
    }

    /// Search, print the table and write the map; returns the merged places
    async fn search_and_show(
        &mut self,
        origin: Coordinates,
        moods: &[Mood],
        radius: Radius,
    ) -> Result<Vec<Place>> {
        let recommendation = self.recommender.recommend(origin, moods, radius).await;

        for mood in &recommendation.cached {
            console::info(
                &mut self.out,
                &format!("Using cached results for mood '{mood}'"),
            )?;
        }
        for (_, message) in &recommendation.failed {
            console::error(&mut self.out, message)?;
        }

        let places = recommendation.places;
        if places.is_empty() {
            return Ok(places);
        }

        print_table(&mut self.out, &places, self.search.table_rows)?;
        let html = render_map(&MapView {
            origin,
            radius,
            moods,
            places: &places,
            profile: &self.profile,
            polylines_per_mood: self.search.polylines_per_mood,
        });
        match write_map(&self.map_path, &html) {
            Ok(()) => console::success(
                &mut self.out,
                &format!(
                    "🗺️ Map saved as {} - open it in your browser!",
                    self.map_path.display()
                ),
            )?,
            Err(e) => console::error(&mut self.out, &format!("Could not write map: {e}"))?,
        }
        Ok(places)
    }

    /// Search, then remember the search and the new favorites
    async fn search_and_record(
        &mut self,
        origin: Coordinates,
        input: &str,
        moods: Vec<Mood>,
        radius: Radius,
    ) -> Result<Vec<Place>> {
        let places = self.search_and_show(origin, &moods, radius).await?;
        if places.is_empty() {
            console::warn(&mut self.out, NO_PLACES_HINT)?;
            return Ok(places);
        }

        let added = self.profile.remember_favorites(&moods, &places);
        self.profile.record_search(
            HistoryEntry::new(input, moods, radius),
            self.search.max_history,
        );
        for (mood, name) in &added {
            console::info(
                &mut self.out,
                &format!("Added '{name}' to your {mood} favorites"),
            )?;
        }
        self.save()?;
        Ok(places)
    }

    /// One search without the menu
    pub async fn recommend_once(
        &mut self,
        location: &str,
        mood_text: &str,
        radius: Option<Radius>,
    ) -> Result<Vec<Place>> {
        let origin = self.locator.locate(location).await?;
        let moods = detect_moods(mood_text);
        console::success(
            &mut self.out,
            &format!("Using moods: {}", moods_with_emoji(&moods)),
        )?;
        let radius = radius.unwrap_or_else(|| self.search.default_radius());
        self.search_and_record(origin, mood_text, moods, radius)
            .await
    }

    async fn recommendation_flow(&mut self, origin: Coordinates) -> Result<Flow> {
        let Some(text) = self.ask("Describe your mood(s): ")? else {
            return Ok(Flow::Quit);
        };
        let detected = detect_moods(&text);
        console::info(
            &mut self.out,
            &format!("Detected moods: {}", moods_with_emoji(&detected)),
        )?;

        console::plain(
            &mut self.out,
            "Select moods by number or name (comma separated), or press Enter for automatic:",
        )?;
        for (i, mood) in Mood::ALL.iter().enumerate() {
            console::plain(&mut self.out, &format!("{}. {}", i + 1, mood))?;
        }
        let Some(selection) = self.ask("Your selection: ")? else {
            return Ok(Flow::Quit);
        };
        let moods = parse_mood_selection(&selection, &Mood::ALL).resolve(&detected);
        console::success(
            &mut self.out,
            &format!("Using moods: {}", moods_with_emoji(&moods)),
        )?;

        let default = self.search.default_radius();
        let Some(radius_input) =
            self.ask(&format!("Enter search radius km (default {}): ", default.km()))?
        else {
            return Ok(Flow::Quit);
        };
        let radius = Radius::from_km_input(&radius_input, default);

        self.search_and_record(origin, &text, moods, radius).await?;
        Ok(Flow::Continue)
    }

    async fn history_flow(&mut self, origin: Coordinates) -> Result<Flow> {
        print_history(&mut self.out, &self.profile)?;
        if self.profile.history.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(selection) =
            self.ask("Enter history number to repeat search or press Enter to continue: ")?
        else {
            return Ok(Flow::Quit);
        };
        let entry = selection
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.profile.history.get(idx))
            .cloned();

        if let Some(entry) = entry {
            let places = self.search_and_show(origin, &entry.moods, entry.radius).await?;
            if places.is_empty() {
                console::warn(&mut self.out, NO_PLACES_HINT)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn favorites_flow(&mut self) -> Result<Flow> {
        let moods = self.profile.favorite_moods();
        if moods.is_empty() {
            console::warn(&mut self.out, "No favorites saved yet.")?;
            return Ok(Flow::Continue);
        }

        console::heading(&mut self.out, Color::Reset, "Choose mood category for favorites:")?;
        for (i, mood) in moods.iter().enumerate() {
            let count = self.profile.favorites_for(*mood).len();
            console::plain(
                &mut self.out,
                &format!("{}. {} ({} places)", i + 1, mood.title(), count),
            )?;
        }
        let Some(choice) = self.ask("Select mood by number (0 to cancel): ")? else {
            return Ok(Flow::Quit);
        };
        let mood = match choice.trim().parse::<usize>() {
            Ok(0) => return Ok(Flow::Continue),
            Ok(n) if n <= moods.len() => moods[n - 1],
            _ => {
                console::error(&mut self.out, "Invalid selection.")?;
                return Ok(Flow::Continue);
            }
        };

        let names: Vec<String> = self
            .profile
            .favorites_for(mood)
            .iter()
            .map(|fav| fav.name.clone())
            .collect();
        console::heading(
            &mut self.out,
            Color::Reset,
            &format!("Places under {} mood:", mood.title()),
        )?;
        for (i, name) in names.iter().enumerate() {
            console::plain(&mut self.out, &format!("{}. {}", i + 1, name))?;
        }

        let Some(choice) = self.ask("Select a place by number (0 cancel, -1 to remove): ")? else {
            return Ok(Flow::Quit);
        };
        let name = match choice.trim().parse::<i64>() {
            Ok(0) => return Ok(Flow::Continue),
            Ok(-1) => return self.remove_favorite_flow(mood, &names),
            Ok(n) if n >= 1 && (n as usize) <= names.len() => names[n as usize - 1].clone(),
            Ok(_) => {
                console::error(&mut self.out, "Invalid choice.")?;
                return Ok(Flow::Continue);
            }
            Err(_) => {
                console::error(&mut self.out, "Invalid input.")?;
                return Ok(Flow::Continue);
            }
        };

        let coords = match self.locator.locate(&name).await {
            Ok(coords) => coords,
            Err(e) => {
                debug!(place = %name, error = %e, "favorite not geocoded");
                console::error(&mut self.out, "Could not find coordinates for selected place.")?;
                return Ok(Flow::Continue);
            }
        };
        let radius = self.search.default_radius();
        let places = self.search_and_show(coords, &[mood], radius).await?;
        if places.is_empty() {
            console::warn(
                &mut self.out,
                "No places found for the selected favorite location and mood.",
            )?;
        }
        Ok(Flow::Continue)
    }

    fn remove_favorite_flow(&mut self, mood: Mood, names: &[String]) -> Result<Flow> {
        let Some(choice) = self.ask("Enter number to remove: ")? else {
            return Ok(Flow::Quit);
        };
        let name = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| names.get(idx));

        let Some(name) = name else {
            console::error(&mut self.out, "Invalid choice.")?;
            return Ok(Flow::Continue);
        };
        if self.profile.remove_favorite(mood, name) {
            self.save()?;
            console::success(
                &mut self.out,
                &format!("Removed favorite '{name}' from mood '{mood}'"),
            )?;
        }
        Ok(Flow::Continue)
    }

    async fn stats_flow(&mut self) -> Result<()> {
        let top_moods = self.profile.top_moods(Mood::ALL.len());
        let top_places = self.profile.top_places(5);
        if top_moods.is_empty() && top_places.is_empty() {
            console::warn(&mut self.out, "No usage recorded yet.")?;
        } else {
            console::heading(&mut self.out, Color::Reset, "Mood usage:")?;
            for (mood, count) in top_moods {
                console::plain(
                    &mut self.out,
                    &format!("  {} {}: {}", mood.emoji(), mood.title(), count),
                )?;
            }
            console::heading(&mut self.out, Color::Reset, "Top places:")?;
            for (name, count) in top_places {
                console::plain(&mut self.out, &format!("  {name}: {count}"))?;
            }
        }

        let stats = self.recommender.cache().stats().await;
        console::info(
            &mut self.out,
            &format!(
                "Cache: {} searches in memory, {} hits, {} misses",
                stats.entry_count, stats.hits, stats.misses
            ),
        )?;
        Ok(())
    }
}
