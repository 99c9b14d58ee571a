//! Login Use Case
//!
//! Authenticates a user by username and password and starts a session.

use std::net::IpAddr;
use std::sync::Arc;

use kernel::validation::FieldErrors;

use crate::application::config::AccountsConfig;
use crate::application::session::StartSessionUseCase;
use crate::domain::entity::User;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{RawPassword, UserName};
use crate::error::{AccountsError, AccountsResult};

pub const USER_DOES_NOT_EXIST: &str = "User does not exist.";

/// Login input, fields as they came in the request body
#[derive(Debug, Default)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    /// Signed value for the session cookie
    pub session_token: String,
}

pub struct LoginUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AccountsConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountsConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        input: LoginInput,
        client_ip: Option<IpAddr>,
    ) -> AccountsResult<LoginOutput> {
        let mut errors = FieldErrors::new();
        let username = errors.require("username", input.username.as_deref());
        let password = errors.require("password", input.password.as_deref());
        let (Some(username), Some(password)) = (username, password) else {
            return Err(AccountsError::Validation(errors));
        };

        // Credentials are compared in lower case, matching how signup stores them.
        let username = UserName::from_db(username);
        let attempt = RawPassword::attempt(password.to_lowercase());

        let Some(mut user) = self.repo.find_user_by_username(&username).await? else {
            return Err(FieldErrors::single("username", USER_DOES_NOT_EXIST).into());
        };

        if !user.password_hash.verify(&attempt, self.config.pepper()) {
            tracing::info!(user_id = %user.user_id, "Login rejected: wrong password");
            return Err(AccountsError::InvalidCredentials);
        }
        if !user.can_login() {
            tracing::info!(user_id = %user.user_id, "Login rejected: inactive user");
            return Err(AccountsError::InvalidCredentials);
        }

        user.record_login();
        self.repo.update_user(&user).await?;

        let session_token = StartSessionUseCase::new(self.repo.clone(), self.config.clone())
            .execute(&user, client_ip)
            .await?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User logged in");

        Ok(LoginOutput {
            user,
            session_token,
        })
    }
}
