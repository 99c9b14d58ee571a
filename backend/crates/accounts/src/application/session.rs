//! Session Use Cases
//!
//! Starting a session after login/signup, and resolving the session cookie
//! on every request. The cookie value is `session_id.signature`, signed with
//! the configured session secret.

use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use crate::application::config::AccountsConfig;
use crate::domain::entity::{Session, User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AccountsError, AccountsResult};

/// Sign a session id for the cookie.
pub fn session_token(config: &AccountsConfig, session_id: Uuid) -> AccountsResult<String> {
    platform::crypto::sign_token(&config.session_secret, &session_id.to_string())
        .map_err(|e| AccountsError::Internal(format!("Failed to sign session: {e}")))
}

/// Verify a cookie value and extract the session id.
pub fn parse_session_token(config: &AccountsConfig, token: &str) -> Option<Uuid> {
    let payload = platform::crypto::verify_token(&config.session_secret, token).ok()?;
    Uuid::parse_str(payload).ok()
}

// ============================================================================
// Start Session
// ============================================================================

pub struct StartSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AccountsConfig>,
}

impl<S> StartSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AccountsConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Persist a new session for `user` and return the signed cookie value.
    pub async fn execute(&self, user: &User, client_ip: Option<IpAddr>) -> AccountsResult<String> {
        let session = Session::new(
            user.user_id,
            client_ip.map(|ip| ip.to_string()),
            self.config.session_ttl_chrono(),
        );
        self.session_repo.create_session(&session).await?;

        tracing::debug!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "Session started"
        );

        session_token(&self.config, session.session_id)
    }
}

// ============================================================================
// Resolve Session
// ============================================================================

pub struct ResolveSessionUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AccountsConfig>,
}

impl<R> ResolveSessionUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountsConfig>) -> Self {
        Self { repo, config }
    }

    /// The logged in user behind `token`, if any.
    ///
    /// Bad signatures, unknown or expired sessions and inactive users all
    /// resolve to `None`. Expired sessions are deleted on sight.
    pub async fn execute(&self, token: &str) -> AccountsResult<Option<User>> {
        let Some(session_id) = parse_session_token(&self.config, token) else {
            tracing::debug!("Rejected session cookie with bad signature");
            return Ok(None);
        };

        let Some(mut session) = self.repo.find_session(session_id).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.repo.delete_session(session_id).await?;
            return Ok(None);
        }

        let user = match self.repo.find_user_by_id(&session.user_id).await? {
            Some(user) if user.is_active => user,
            _ => return Ok(None),
        };

        session.touch();
        self.repo.touch_session(&session).await?;

        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_roundtrip() {
        let config = AccountsConfig::development();
        let id = Uuid::new_v4();
        let token = session_token(&config, id).unwrap();

        assert_eq!(parse_session_token(&config, &token), Some(id));
    }

    #[test]
    fn test_session_token_rejects_other_secret() {
        let config = AccountsConfig::development();
        let other = AccountsConfig::development();
        let token = session_token(&config, Uuid::new_v4()).unwrap();

        assert_eq!(parse_session_token(&other, &token), None);
        assert_eq!(parse_session_token(&config, "not-a-token"), None);
    }

    #[test]
    fn test_session_token_rejects_signed_garbage() {
        let config = AccountsConfig::development();
        let token = platform::crypto::sign_token(&config.session_secret, "admin").unwrap();
        assert_eq!(parse_session_token(&config, &token), None);
    }
}
