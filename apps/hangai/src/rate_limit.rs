//! Per-host rate limiting using token bucket algorithm
//!
//! Public OpenStreetMap services ask clients to stay under a fixed request
//! rate; every outgoing request first takes a token for its host.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Token bucket for a single host
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,
    /// Maximum tokens (burst capacity)
    max_tokens: f64,
    /// Tokens added per second
    refill_rate: f64,
    /// Last time tokens were updated
    last_update: Instant,
}

impl TokenBucket {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_update: Instant::now(),
        }
    }

    /// Try to consume a token, refilling based on elapsed time
    fn try_consume(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until one full token is available
    fn time_to_next_token(&self) -> Duration {
        let missing = (1.0 - self.tokens).max(0.0);
        Duration::from_secs_f64(missing / self.refill_rate)
    }

    fn remaining(&self) -> u32 {
        self.tokens as u32
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Maximum requests in the window
    pub requests: u32,
    /// Time window in seconds
    pub per_secs: u32,
}

impl RateLimitConfig {
    /// Calculate tokens per second (refill rate)
    fn refill_rate(&self) -> f64 {
        f64::from(self.requests) / f64::from(self.per_secs)
    }
}

/// Rate limiter keyed by host name
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<String, TokenBucket>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Check if a request to `key` may go out now, consuming a token if so
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let mut buckets = self.buckets.write().await;

        let bucket = buckets.entry(key.to_string()).or_insert_with(|| {
            TokenBucket::new(f64::from(self.config.requests), self.config.refill_rate())
        });

        if bucket.try_consume() {
            RateLimitResult::Allowed {
                remaining: bucket.remaining(),
                limit: self.config.requests,
            }
        } else {
            RateLimitResult::Limited {
                retry_after: bucket.time_to_next_token(),
                limit: self.config.requests,
            }
        }
    }

    /// Wait until a request to `key` is allowed
    pub async fn acquire(&self, key: &str) {
        loop {
            match self.check(key).await {
                RateLimitResult::Allowed { .. } => return,
                RateLimitResult::Limited { retry_after, .. } => {
                    debug!(host = key, wait_ms = retry_after.as_millis() as u64, "rate limited");
                    tokio::time::sleep(retry_after.max(Duration::from_millis(1))).await;
                }
            }
        }
    }

    /// Forget buckets that haven't been used recently
    pub async fn cleanup(&self, max_age: Duration) {
        let mut buckets = self.buckets.write().await;
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_update) < max_age);
    }

    /// Get stats about the rate limiter
    pub async fn stats(&self) -> RateLimiterStats {
        let buckets = self.buckets.read().await;
        RateLimiterStats {
            tracked_hosts: buckets.len(),
        }
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed { remaining: u32, limit: u32 },
    /// Request is rate limited
    Limited { retry_after: Duration, limit: u32 },
}

impl RateLimitResult {
    /// Check if the request is allowed
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Rate limiter statistics
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub tracked_hosts: usize,
}
