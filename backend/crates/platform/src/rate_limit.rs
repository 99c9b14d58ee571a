//! Rate Limiting Infrastructure
//!
//! Rates are written as `"<count>/<period>"`, e.g. `3/s`, `100/h` or `10/5m`.
//! Counting uses fixed windows aligned to the Unix epoch.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::cache::MemoryCache;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("invalid rate `{0}`: expected <count>/<period>, e.g. 3/s or 10/5m")]
    InvalidRate(String),
    #[error("rate limit backend unavailable: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Parse `"<count>/<multiplier?><unit>"` where unit is one of
    /// `s`, `m`, `h`, `d` (full words such as `min` or `hour` work too).
    pub fn parse(rate: &str) -> Result<Self, RateLimitError> {
        let invalid = || RateLimitError::InvalidRate(rate.to_string());

        let (count, period) = rate.trim().split_once('/').ok_or_else(invalid)?;
        let max_requests: u32 = count.trim().parse().map_err(|_| invalid())?;

        let period = period.trim();
        let split = period
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (multiplier, unit) = period.split_at(split);
        let multiplier: u64 = if multiplier.is_empty() {
            1
        } else {
            multiplier.parse().map_err(|_| invalid())?
        };

        let unit_secs = match unit.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 60 * 60,
            Some('d') => 24 * 60 * 60,
            _ => return Err(invalid()),
        };

        if max_requests == 0 || multiplier == 0 {
            return Err(invalid());
        }

        Ok(Self::new(max_requests, multiplier * unit_secs))
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one hit against `key` and report whether it is within the limit.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

impl MemoryCache {
    fn hit_window(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let window_ms = config.window_ms().max(1);
        let window_start = now_ms - now_ms.rem_euclid(window_ms);
        let cache_key = format!("rl:{}:{}", key, window_start);

        let count = self.incr(&cache_key, Some(config.window));
        let max = u64::from(config.max_requests);

        RateLimitResult {
            allowed: count <= max,
            remaining: max.saturating_sub(count) as u32,
            reset_at_ms: window_start + window_ms,
        }
    }
}

impl RateLimitStore for MemoryCache {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.hit_window(key, config, now_ms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rates() {
        assert_eq!(RateLimitConfig::parse("3/s").unwrap(), RateLimitConfig::new(3, 1));
        assert_eq!(RateLimitConfig::parse("3/m").unwrap(), RateLimitConfig::new(3, 60));
        assert_eq!(
            RateLimitConfig::parse("100/hour").unwrap(),
            RateLimitConfig::new(100, 3600)
        );
        assert_eq!(
            RateLimitConfig::parse("10/5m").unwrap(),
            RateLimitConfig::new(10, 300)
        );
        assert_eq!(
            RateLimitConfig::parse(" 1 / d ").unwrap(),
            RateLimitConfig::new(1, 86_400)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for rate in ["", "3", "3/", "x/s", "3/5", "3/w", "0/s", "3/0s"] {
            assert!(
                matches!(RateLimitConfig::parse(rate), Err(RateLimitError::InvalidRate(_))),
                "{rate} should be rejected"
            );
        }
    }

    #[test]
    fn test_fixed_window_counts() {
        let cache = MemoryCache::new();
        let config = RateLimitConfig::new(3, 60);
        let now = 1_700_000_010_000;

        let results: Vec<_> = (0..4)
            .map(|_| cache.hit_window("login:POST:127.0.0.1", &config, now))
            .collect();

        assert!(results[..3].iter().all(|r| r.allowed));
        assert_eq!(results[0].remaining, 2);
        assert_eq!(results[2].remaining, 0);
        assert!(!results[3].allowed);
        assert_eq!(results[3].reset_at_ms, 1_700_000_040_000);
    }

    #[test]
    fn test_next_window_starts_fresh() {
        let cache = MemoryCache::new();
        let config = RateLimitConfig::new(1, 1);

        assert!(cache.hit_window("k", &config, 5_000).allowed);
        assert!(!cache.hit_window("k", &config, 5_999).allowed);
        assert!(cache.hit_window("k", &config, 6_000).allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = MemoryCache::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(cache.hit_window("signup:POST:10.0.0.1", &config, 0).allowed);
        assert!(cache.hit_window("login:POST:10.0.0.1", &config, 0).allowed);
        assert!(!cache.hit_window("login:POST:10.0.0.1", &config, 0).allowed);
    }

    #[tokio::test]
    async fn test_store_trait() {
        let cache = MemoryCache::new();
        let config = RateLimitConfig::parse("2/h").unwrap();
        let first = RateLimitStore::check_and_increment(&cache, "k", &config)
            .await
            .unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
    }
}
