//! Manage Users Use Case
//!
//! Staff-only listing, retrieval, update and deletion of accounts.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::validation::FieldErrors;

use crate::domain::entity::{User, UserProfile};
use crate::domain::repository::{SessionRepository, UserProfileRepository, UserRepository};
use crate::domain::value_object::Email;
use crate::error::{AccountsError, AccountsResult};

/// A user together with its profile, as the admin endpoints show it.
#[derive(Debug, Clone)]
pub struct ManagedUser {
    pub user: User,
    pub profile: UserProfile,
}

/// `email: Some(None)` removes the address.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub email: Option<Option<String>>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

pub struct ManageUsersUseCase<R>
where
    R: UserRepository + UserProfileRepository + SessionRepository,
{
    repo: Arc<R>,
}

impl<R> ManageUsersUseCase<R>
where
    R: UserRepository + UserProfileRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    fn ensure_staff(viewer: Option<&User>) -> AccountsResult<&User> {
        let viewer = viewer.ok_or(AccountsError::NotAuthenticated)?;
        if !viewer.is_staff {
            return Err(AccountsError::PermissionDenied);
        }
        Ok(viewer)
    }

    /// Profile for `user`, created on first access when missing.
    async fn profile_for(&self, user: &User) -> AccountsResult<UserProfile> {
        if let Some(profile) = self.repo.find_profile_by_user_id(&user.user_id).await? {
            return Ok(profile);
        }
        let profile = UserProfile::empty_for(user.user_id);
        self.repo.create_profile(&profile).await?;
        Ok(profile)
    }

    async fn load(&self, user_id: &UserId) -> AccountsResult<User> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AccountsError::UserNotFound)
    }

    pub async fn list(&self, viewer: Option<&User>) -> AccountsResult<Vec<ManagedUser>> {
        Self::ensure_staff(viewer)?;

        let users = self.repo.list_users().await?;
        let mut managed = Vec::with_capacity(users.len());
        for user in users {
            let profile = self.profile_for(&user).await?;
            managed.push(ManagedUser { user, profile });
        }
        Ok(managed)
    }

    pub async fn retrieve(
        &self,
        viewer: Option<&User>,
        user_id: UserId,
    ) -> AccountsResult<ManagedUser> {
        Self::ensure_staff(viewer)?;

        let user = self.load(&user_id).await?;
        let profile = self.profile_for(&user).await?;
        Ok(ManagedUser { user, profile })
    }

    pub async fn update(
        &self,
        viewer: Option<&User>,
        user_id: UserId,
        patch: UserPatch,
    ) -> AccountsResult<ManagedUser> {
        let staff = Self::ensure_staff(viewer)?;
        let mut user = self.load(&user_id).await?;

        if let Some(email) = patch.email {
            let email = match email.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(Email::new(raw).map_err(|e| FieldErrors::single("email", e.to_string()))?),
            };
            if let Some(new_email) = &email {
                let unchanged = user.email.as_ref() == Some(new_email);
                if !unchanged && self.repo.email_exists(new_email).await? {
                    return Err(AccountsError::EmailTaken);
                }
            }
            user.set_email(email);
        }
        if let Some(is_staff) = patch.is_staff {
            user.set_staff(is_staff);
        }
        if let Some(is_active) = patch.is_active {
            user.set_active(is_active);
        }

        self.repo.update_user(&user).await?;
        tracing::info!(
            staff_id = %staff.user_id,
            user_id = %user.user_id,
            is_staff = user.is_staff,
            is_active = user.is_active,
            "User updated by staff"
        );

        let profile = self.profile_for(&user).await?;
        Ok(ManagedUser { user, profile })
    }

    /// Removes the user with its sessions and profile.
    pub async fn delete(&self, viewer: Option<&User>, user_id: UserId) -> AccountsResult<()> {
        let staff = Self::ensure_staff(viewer)?;
        self.load(&user_id).await?;

        let sessions = self.repo.delete_sessions_for_user(&user_id).await?;
        self.repo.delete_profile_for_user(&user_id).await?;
        if !self.repo.delete_user(&user_id).await? {
            return Err(AccountsError::UserNotFound);
        }

        tracing::info!(
            staff_id = %staff.user_id,
            user_id = %user_id,
            sessions,
            "User deleted by staff"
        );
        Ok(())
    }
}
