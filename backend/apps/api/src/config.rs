//! Server Configuration
//!
//! Read from the process environment (after `.env` is loaded):
//!
//! | variable              | default                                          |
//! |-----------------------|--------------------------------------------------|
//! | `DATABASE_URL`        | required                                         |
//! | `SESSION_SECRET`      | base64, 32 bytes; required in release builds     |
//! | `FRONTEND_ORIGINS`    | `http://localhost:40922,http://127.0.0.1:40922`  |
//! | `BIND_ADDR`           | `0.0.0.0:31113`                                  |
//! | `ACCOUNTS_RATE`       | `3/s`                                            |
//! | `TRUST_FORWARDED_FOR` | `false` (throttle on the peer address)           |

use std::net::SocketAddr;

use accounts::AccountsConfig;
use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub accounts_rate: RateLimitConfig,
    pub trust_forwarded_for: bool,
    /// `None` only in debug builds, where a random secret is generated
    pub session_secret: Option<[u8; 32]>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Release builds refuse to start without
    /// `SESSION_SECRET`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let accounts_rate = match lookup("ACCOUNTS_RATE") {
            Some(rate) => RateLimitConfig::parse(&rate)?,
            None => AccountsConfig::default().rate_limit,
        };

        let trust_forwarded_for = match lookup("TRUST_FORWARDED_FOR").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => bail!("TRUST_FORWARDED_FOR must be true or false, got {other}"),
        };

        let session_secret = match lookup("SESSION_SECRET") {
            Some(encoded) => Some(decode_secret(&encoded)?),
            None if cfg!(debug_assertions) => None,
            None => bail!("SESSION_SECRET must be set in production"),
        };

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            accounts_rate,
            trust_forwarded_for,
            session_secret,
        })
    }

    pub fn accounts_config(&self) -> AccountsConfig {
        let base = match self.session_secret {
            Some(secret) => AccountsConfig {
                session_secret: secret,
                ..AccountsConfig::default()
            },
            None => AccountsConfig::development(),
        };
        AccountsConfig {
            rate_limit: self.accounts_rate.clone(),
            trust_forwarded_for: self.trust_forwarded_for,
            ..base
        }
    }
}

fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .context("SESSION_SECRET must be base64")?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", bytes.len())
    })
}
