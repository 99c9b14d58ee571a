//! In-Memory Repository Implementations
//!
//! `DashMap`-backed store used by the test harness and local runs without a
//! database. Clones share the same maps.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kernel::id::{ProfileId, UserId};
use uuid::Uuid;

use crate::domain::entity::{Session, User, UserProfile};
use crate::domain::repository::{SessionRepository, UserProfileRepository, UserRepository};
use crate::domain::value_object::{Email, UserName};
use crate::error::{AccountsError, AccountsResult};

#[derive(Clone, Default)]
pub struct MemoryAccountsRepository {
    users: Arc<DashMap<UserId, User>>,
    /// username -> user id, guards uniqueness
    usernames: Arc<DashMap<String, UserId>>,
    profiles: Arc<DashMap<ProfileId, UserProfile>>,
    sessions: Arc<DashMap<Uuid, Session>>,
}

impl MemoryAccountsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_owner(&self, email: &Email) -> Option<UserId> {
        self.users
            .iter()
            .find(|u| u.email.as_ref() == Some(email))
            .map(|u| u.user_id)
    }
}

impl UserRepository for MemoryAccountsRepository {
    async fn create_user(&self, user: &User) -> AccountsResult<()> {
        if let Some(email) = &user.email {
            if self.email_owner(email).is_some() {
                return Err(AccountsError::EmailTaken);
            }
        }

        match self.usernames.entry(user.username.as_str().to_string()) {
            Entry::Occupied(_) => return Err(AccountsError::UsernameTaken),
            Entry::Vacant(slot) => {
                slot.insert(user.user_id);
            }
        }
        self.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AccountsResult<Option<User>> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_user_by_username(&self, username: &UserName) -> AccountsResult<Option<User>> {
        let Some(user_id) = self.usernames.get(username.as_str()).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn username_exists(&self, username: &UserName) -> AccountsResult<bool> {
        Ok(self.usernames.contains_key(username.as_str()))
    }

    async fn email_exists(&self, email: &Email) -> AccountsResult<bool> {
        Ok(self.email_owner(email).is_some())
    }

    async fn list_users(&self) -> AccountsResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> AccountsResult<()> {
        if let Some(email) = &user.email {
            if self.email_owner(email).is_some_and(|owner| owner != user.user_id) {
                return Err(AccountsError::EmailTaken);
            }
        }
        if let Some(mut stored) = self.users.get_mut(&user.user_id) {
            *stored = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> AccountsResult<bool> {
        let Some((_, user)) = self.users.remove(user_id) else {
            return Ok(false);
        };
        self.usernames.remove(user.username.as_str());
        Ok(true)
    }
}

impl UserProfileRepository for MemoryAccountsRepository {
    async fn create_profile(&self, profile: &UserProfile) -> AccountsResult<()> {
        self.profiles.insert(profile.profile_id, profile.clone());
        Ok(())
    }

    async fn find_profile_by_id(
        &self,
        profile_id: &ProfileId,
    ) -> AccountsResult<Option<UserProfile>> {
        Ok(self.profiles.get(profile_id).map(|p| p.clone()))
    }

    async fn find_profile_by_user_id(
        &self,
        user_id: &UserId,
    ) -> AccountsResult<Option<UserProfile>> {
        Ok(self
            .profiles
            .iter()
            .find(|p| &p.user_id == user_id)
            .map(|p| p.clone()))
    }

    async fn update_profile(&self, profile: &UserProfile) -> AccountsResult<()> {
        if let Some(mut stored) = self.profiles.get_mut(&profile.profile_id) {
            *stored = profile.clone();
        }
        Ok(())
    }

    async fn delete_profile_for_user(&self, user_id: &UserId) -> AccountsResult<()> {
        self.profiles.retain(|_, p| &p.user_id != user_id);
        Ok(())
    }
}

impl SessionRepository for MemoryAccountsRepository {
    async fn create_session(&self, session: &Session) -> AccountsResult<()> {
        self.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> AccountsResult<Option<Session>> {
        Ok(self.sessions.get(&session_id).map(|s| s.clone()))
    }

    async fn touch_session(&self, session: &Session) -> AccountsResult<()> {
        if let Some(mut stored) = self.sessions.get_mut(&session.session_id) {
            stored.last_activity_at = session.last_activity_at;
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AccountsResult<()> {
        self.sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: &UserId) -> AccountsResult<u64> {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| &s.user_id != user_id);
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }

    async fn cleanup_expired_sessions(&self) -> AccountsResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at_ms >= now_ms);
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }
}
