//! HangAI: mood-based hangout recommender
//!
//! Turns a location and a free-text mood description into nearby places
//! from OpenStreetMap, shown as a console table and an interactive map.
//!
//! - Addresses are geocoded through Nominatim, rate limited per host
//! - Places come from the Overpass API, cached in memory and on disk
//! - History, favorites and usage counters persist in a native_db store

pub mod cache;
pub mod config;
pub mod console;
pub mod error;
pub mod geocode;
pub mod map;
pub mod overpass;
pub mod rate_limit;
pub mod recommend;
pub mod session;
pub mod table;

pub use cache::{CacheStats, PlaceCache};
pub use config::{CacheConfig, Config, ConfigError, SearchConfig};
pub use console::{Prompt, StdinPrompt};
pub use error::{AppError, Result};
pub use geocode::{GeocodeError, Geocoder, Locator};
pub use map::{render_map, write_map, MapView};
pub use overpass::{FetchError, OverpassClient, PlaceSource};
pub use rate_limit::{RateLimitConfig, RateLimitResult, RateLimiter, RateLimiterStats};
pub use recommend::{Recommendation, Recommender};
pub use session::{print_history, Session};
