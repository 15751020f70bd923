//! RON configuration for HangAI

use crate::rate_limit::RateLimitConfig;
use hangai_core::{Radius, DEFAULT_RADIUS_M, MAX_HISTORY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Nominatim geocoder settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocoderConfig {
    /// Base URL; `/search` is appended
    #[serde(default = "default_geocoder_url")]
    pub url: String,
    /// User-Agent sent with every request (required by Nominatim)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoder_retries")]
    pub retries: u32,
    /// Delay before the second attempt; doubles afterwards
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_geocoder_rate_limit")]
    pub rate_limit: RateLimitConfig,
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "HangAI_Robust".to_string()
}

fn default_geocoder_retries() -> u32 {
    5
}

fn default_initial_delay() -> u64 {
    2000
}

fn default_geocoder_timeout() -> u64 {
    10_000
}

fn default_geocoder_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        requests: 1,
        per_secs: 1,
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            user_agent: default_user_agent(),
            retries: default_geocoder_retries(),
            initial_delay_ms: default_initial_delay(),
            timeout_ms: default_geocoder_timeout(),
            rate_limit: default_geocoder_rate_limit(),
        }
    }
}

/// Overpass API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    #[serde(default = "default_overpass_retries")]
    pub retries: u32,
    #[serde(default = "default_overpass_timeout")]
    pub timeout_ms: u64,
    /// Sleep after failed attempt `n` is `backoff_base_ms * 2^n`
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_retries() -> u32 {
    3
}

fn default_overpass_timeout() -> u64 {
    30_000
}

fn default_backoff_base() -> u64 {
    1000
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            retries: default_overpass_retries(),
            timeout_ms: default_overpass_timeout(),
            backoff_base_ms: default_backoff_base(),
        }
    }
}

/// Search and presentation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_radius")]
    pub default_radius_m: u32,
    /// Rows shown in the places table
    #[serde(default = "default_table_rows")]
    pub table_rows: usize,
    /// Closest places per mood connected to the user on the map
    #[serde(default = "default_polylines")]
    pub polylines_per_mood: usize,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}

fn default_table_rows() -> usize {
    10
}

fn default_polylines() -> usize {
    3
}

fn default_max_history() -> usize {
    MAX_HISTORY
}

impl SearchConfig {
    pub fn default_radius(&self) -> Radius {
        Radius(self.default_radius_m)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius(),
            table_rows: default_table_rows(),
            polylines_per_mood: default_polylines(),
            max_history: default_max_history(),
        }
    }
}

/// Place cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum in-memory entries
    #[serde(default = "default_cache_entries")]
    pub max_entries: u64,
    /// Age after which cached searches are refetched
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_entries() -> u64 {
    1000
}

fn default_cache_ttl() -> u64 {
    7 * 24 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_entries(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

/// File locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("hangai.db")
}

fn default_map_path() -> PathBuf {
    PathBuf::from("hangai_map.html")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            map_path: default_map_path(),
        }
    }
}

impl Config {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron(&content)
    }

    /// Parse and validate configuration text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geocoder.url.trim().is_empty() {
            return Err(ConfigError::Validation("geocoder.url is empty".to_string()));
        }
        if self.overpass.url.trim().is_empty() {
            return Err(ConfigError::Validation("overpass.url is empty".to_string()));
        }
        if self.geocoder.retries == 0 || self.overpass.retries == 0 {
            return Err(ConfigError::Validation(
                "retries must be at least 1".to_string(),
            ));
        }
        if self.geocoder.rate_limit.requests == 0 || self.geocoder.rate_limit.per_secs == 0 {
            return Err(ConfigError::Validation(
                "geocoder.rate_limit must allow at least one request".to_string(),
            ));
        }
        if self.search.default_radius_m == 0 {
            return Err(ConfigError::Validation(
                "search.default_radius_m must be positive".to_string(),
            ));
        }
        if self.search.max_history == 0 {
            return Err(ConfigError::Validation(
                "search.max_history must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}
