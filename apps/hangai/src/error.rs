//! Application error type

use crate::config::ConfigError;
use crate::geocode::GeocodeError;
use crate::overpass::FetchError;
use thiserror::Error;

/// Errors surfaced by the HangAI application
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Storage error: {0}")]
    Store(#[from] hangai_db::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
