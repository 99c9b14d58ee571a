//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in `infra`.
//! Method names are unique across traits so that one store type can
//! implement all of them without ambiguous calls.

use kernel::id::{ProfileId, UserId};
use uuid::Uuid;

use crate::domain::entity::{Session, User, UserProfile};
use crate::domain::value_object::{Email, UserName};
use crate::error::AccountsResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Fails with `UsernameTaken` / `EmailTaken` on unique violations.
    async fn create_user(&self, user: &User) -> AccountsResult<()>;

    async fn find_user_by_id(&self, user_id: &UserId) -> AccountsResult<Option<User>>;

    async fn find_user_by_username(&self, username: &UserName) -> AccountsResult<Option<User>>;

    async fn username_exists(&self, username: &UserName) -> AccountsResult<bool>;

    async fn email_exists(&self, email: &Email) -> AccountsResult<bool>;

    /// Oldest first.
    async fn list_users(&self) -> AccountsResult<Vec<User>>;

    async fn update_user(&self, user: &User) -> AccountsResult<()>;

    /// Returns whether a row was deleted.
    async fn delete_user(&self, user_id: &UserId) -> AccountsResult<bool>;
}

#[trait_variant::make(UserProfileRepository: Send)]
pub trait LocalUserProfileRepository {
    async fn create_profile(&self, profile: &UserProfile) -> AccountsResult<()>;

    async fn find_profile_by_id(&self, profile_id: &ProfileId)
    -> AccountsResult<Option<UserProfile>>;

    async fn find_profile_by_user_id(&self, user_id: &UserId)
    -> AccountsResult<Option<UserProfile>>;

    async fn update_profile(&self, profile: &UserProfile) -> AccountsResult<()>;

    async fn delete_profile_for_user(&self, user_id: &UserId) -> AccountsResult<()>;
}

#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &Session) -> AccountsResult<()>;

    /// Expired sessions are returned too; callers decide what to do with them.
    async fn find_session(&self, session_id: Uuid) -> AccountsResult<Option<Session>>;

    async fn touch_session(&self, session: &Session) -> AccountsResult<()>;

    async fn delete_session(&self, session_id: Uuid) -> AccountsResult<()>;

    async fn delete_sessions_for_user(&self, user_id: &UserId) -> AccountsResult<u64>;

    async fn cleanup_expired_sessions(&self) -> AccountsResult<u64>;
}

/// Everything the accounts HTTP layer needs from storage.
pub trait AccountsStore:
    UserRepository + UserProfileRepository + SessionRepository + Clone + Send + Sync + 'static
{
}

impl<T> AccountsStore for T where
    T: UserRepository + UserProfileRepository + SessionRepository + Clone + Send + Sync + 'static
{
}
