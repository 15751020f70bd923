//! Nearby place lookup through the Overpass API

use crate::config::OverpassConfig;
use async_trait::async_trait;
use hangai_core::overpass::{build_query, parse_response, places_from_response};
use hangai_core::{Coordinates, Mood, Place, Radius};
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Place lookup error
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to retrieve places for mood '{mood}' after {attempts} attempts: {last_error}")]
    Exhausted {
        mood: Mood,
        attempts: u32,
        last_error: String,
    },
    #[error("Could not build HTTP client: {0}")]
    Client(String),
}

/// Anything that can list places for a mood around a point
#[async_trait]
pub trait PlaceSource: Send + Sync {
    async fn fetch(
        &self,
        origin: Coordinates,
        mood: Mood,
        radius: Radius,
    ) -> Result<Vec<Place>, FetchError>;
}

/// Overpass API client with retries
pub struct OverpassClient {
    client: Client,
    url: Url,
    retries: u32,
    backoff_base: Duration,
}

impl OverpassClient {
    /// Create a client from config
    pub fn new(config: &OverpassConfig, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let url = Url::parse(&config.url)
            .map_err(|e| FetchError::Client(format!("{}: {e}", config.url)))?;

        Ok(Self {
            client,
            url,
            retries: config.retries.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        })
    }

    /// Sleep after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }

    async fn attempt(&self, query: &str) -> Result<String, String> {
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("data", query)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        response.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl PlaceSource for OverpassClient {
    async fn fetch(
        &self,
        origin: Coordinates,
        mood: Mood,
        radius: Radius,
    ) -> Result<Vec<Place>, FetchError> {
        let query = build_query(origin, mood, radius);
        debug!(host = self.url.host_str(), %mood, %query, "overpass query");

        let mut last_error = String::new();
        for attempt in 1..=self.retries {
            let result = match self.attempt(&query).await {
                Ok(body) => parse_response(&body).map_err(|e| e.to_string()),
                Err(e) => Err(e),
            };

            match result {
                Ok(response) => {
                    let places = places_from_response(response, origin);
                    info!(%mood, count = places.len(), attempt, "fetched places");
                    return Ok(places);
                }
                Err(e) => {
                    warn!(%mood, attempt, error = %e, "overpass attempt failed");
                    last_error = e;
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        Err(FetchError::Exhausted {
            mood,
            attempts: self.retries,
            last_error,
        })
    }
}
