//! Database models for persistent storage.

mod places;
mod profile;

pub use places::*;
pub use profile::*;
