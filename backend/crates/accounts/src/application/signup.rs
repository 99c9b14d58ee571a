//! Signup Use Case
//!
//! Validates the form, creates the user with an empty profile and logs the
//! new user in.

use std::net::IpAddr;
use std::sync::Arc;

use kernel::validation::FieldErrors;

use crate::application::config::AccountsConfig;
use crate::application::session::StartSessionUseCase;
use crate::domain::entity::{User, UserProfile};
use crate::domain::repository::{SessionRepository, UserProfileRepository, UserRepository};
use crate::domain::value_object::user_password::policy_message;
use crate::domain::value_object::{Email, RawPassword, UserName, UserPassword};
use crate::error::{AccountsError, AccountsResult};

#[derive(Debug, Default)]
pub struct SignupInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct SignupOutput {
    pub user: User,
    pub profile: UserProfile,
    pub session_token: String,
}

pub struct SignupUseCase<R>
where
    R: UserRepository + UserProfileRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AccountsConfig>,
}

impl<R> SignupUseCase<R>
where
    R: UserRepository + UserProfileRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountsConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        input: SignupInput,
        client_ip: Option<IpAddr>,
    ) -> AccountsResult<SignupOutput> {
        let (username, email, password) = self.validate(input).await?;

        let password_hash =
            UserPassword::from_raw(&password, self.config.pepper(), self.config.password_hash_cost)?;
        let user = User::new(username, Some(email), password_hash);
        self.repo.create_user(&user).await?;

        let profile = UserProfile::empty_for(user.user_id);
        self.repo.create_profile(&profile).await?;

        let session_token = StartSessionUseCase::new(self.repo.clone(), self.config.clone())
            .execute(&user, client_ip)
            .await?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User signed up");

        Ok(SignupOutput {
            user,
            profile,
            session_token,
        })
    }

    /// Field checks first, then uniqueness against storage.
    async fn validate(&self, input: SignupInput) -> AccountsResult<(UserName, Email, RawPassword)> {
        let mut errors = FieldErrors::new();

        let username = errors
            .require("username", input.username.as_deref())
            .and_then(|raw| match UserName::new(raw) {
                Ok(name) => Some(name),
                Err(e) => {
                    errors.add("username", e.to_string());
                    None
                }
            });

        let email = errors
            .require("email", input.email.as_deref())
            .and_then(|raw| match Email::new(raw) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.add("email", e.to_string());
                    None
                }
            });

        let password = errors
            .require("password", input.password.as_deref())
            .and_then(|raw| match RawPassword::new(raw.to_lowercase()) {
                Ok(password) => Some(password),
                Err(e) => {
                    errors.add("password", policy_message(&e));
                    None
                }
            });

        if let Some(username) = &username {
            if self.repo.username_exists(username).await? {
                errors.add("username", AccountsError::UsernameTaken.to_string());
            }
        }
        if let Some(email) = &email {
            if self.repo.email_exists(email).await? {
                errors.add("email", AccountsError::EmailTaken.to_string());
            }
        }

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => {
                Ok((username, email, password))
            }
            _ => Err(AccountsError::Validation(errors)),
        }
    }
}
