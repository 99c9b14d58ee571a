//! Logout Use Case

use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::application::session::parse_session_token;
use crate::domain::repository::SessionRepository;
use crate::error::AccountsResult;

pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AccountsConfig>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AccountsConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Delete the session behind `token`. Missing or forged tokens are a no-op.
    pub async fn execute(&self, token: Option<&str>) -> AccountsResult<()> {
        let Some(session_id) = token.and_then(|t| parse_session_token(&self.config, t)) else {
            return Ok(());
        };

        self.session_repo.delete_session(session_id).await?;
        tracing::info!(session_id = %session_id, "User logged out");

        Ok(())
    }
}
