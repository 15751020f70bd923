//! HangAI DB - Embedded storage using native_db
//!
//! Provides persistent storage for:
//! - The user profile (history, favorites, usage counters)
//! - Cached nearby-place searches keyed by location, mood and radius

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use store::{CachedPlaces, Store};
