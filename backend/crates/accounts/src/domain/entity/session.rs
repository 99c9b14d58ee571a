//! Session Entity
//!
//! Server-side login session. The cookie only carries the signed session id.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: UserId,
    /// Unix timestamp, milliseconds
    pub expires_at_ms: i64,
    pub client_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// TTL comes from configuration.
    pub fn new(user_id: UserId, client_ip: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            expires_at_ms: (now + ttl).timestamp_millis(),
            client_ip,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}
