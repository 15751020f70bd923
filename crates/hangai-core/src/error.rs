//! Error types for hangai-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown mood: {0}")]
    UnknownMood(String),

    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Invalid search key: {0}")]
    InvalidSearchKey(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
