//! Application Configuration
//!
//! Configuration for the accounts application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::HashCost;
use platform::rate_limit::RateLimitConfig;

pub use platform::cookie::SameSite;

/// Accounts application configuration
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// HMAC key for session cookies (32 bytes)
    pub session_secret: [u8; 32],
    /// Session lifetime (2 weeks)
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Application-wide password pepper
    pub password_pepper: Option<Vec<u8>>,
    pub password_hash_cost: HashCost,
    /// Per client IP, per endpoint and method
    pub rate_limit: RateLimitConfig,
    /// Throttle on the `X-Forwarded-For` address instead of the peer address.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "sessionid".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(14 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            password_hash_cost: HashCost::Standard,
            rate_limit: RateLimitConfig::new(3, 1),
            trust_forwarded_for: false,
        }
    }
}

impl AccountsConfig {
    /// Config with a random session secret
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::weeks(2))
    }

    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            max_age_secs: Some(self.session_ttl.as_secs() as i64),
            ..Default::default()
        }
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config() {
        let config = AccountsConfig::development();
        assert!(!config.cookie_secure);
        assert_ne!(config.session_secret, [0u8; 32]);
        assert_eq!(config.session_cookie_name, "sessionid");
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_cookie_config_follows_settings() {
        let config = AccountsConfig::development();
        let cookie = config.cookie_config();
        assert_eq!(cookie.name, "sessionid");
        assert!(!cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.max_age_secs, Some(14 * 24 * 3600));
    }
}
