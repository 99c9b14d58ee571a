//! Update Profile Use Case
//!
//! Owner-only edit of nickname and avatar URL.

use std::sync::Arc;

use kernel::id::ProfileId;
use kernel::validation::FieldErrors;

use crate::domain::entity::{ProfileChanges, User, UserProfile};
use crate::domain::repository::UserProfileRepository;
use crate::domain::value_object::{AvatarUrl, Nickname};
use crate::error::{AccountsError, AccountsResult};

/// `None` = field absent from the request, `Some(None)` = explicit null.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub nickname: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// PUT: absent fields are cleared
    Replace,
    /// PATCH: absent fields are left alone
    Partial,
}

pub struct UpdateProfileUseCase<P>
where
    P: UserProfileRepository,
{
    profile_repo: Arc<P>,
}

impl<P> UpdateProfileUseCase<P>
where
    P: UserProfileRepository,
{
    pub fn new(profile_repo: Arc<P>) -> Self {
        Self { profile_repo }
    }

    pub async fn execute(
        &self,
        viewer: Option<&User>,
        profile_id: ProfileId,
        input: UpdateProfileInput,
        mode: UpdateMode,
    ) -> AccountsResult<UserProfile> {
        let viewer = viewer.ok_or(AccountsError::NotAuthenticated)?;

        let mut profile = self
            .profile_repo
            .find_profile_by_id(&profile_id)
            .await?
            .ok_or(AccountsError::ProfileNotFound)?;

        if !profile.is_owned_by(&viewer.user_id) {
            tracing::info!(
                user_id = %viewer.user_id,
                profile_id = %profile_id,
                "Profile update by non-owner rejected"
            );
            return Err(AccountsError::PermissionDenied);
        }

        let changes = Self::validate(input, mode)?;
        profile.apply(changes);
        self.profile_repo.update_profile(&profile).await?;

        Ok(profile)
    }

    fn validate(input: UpdateProfileInput, mode: UpdateMode) -> Result<ProfileChanges, FieldErrors> {
        let (nickname, avatar_url) = match mode {
            UpdateMode::Partial => (input.nickname, input.avatar_url),
            UpdateMode::Replace => (
                Some(input.nickname.flatten()),
                Some(input.avatar_url.flatten()),
            ),
        };

        let mut errors = FieldErrors::new();
        let mut changes = ProfileChanges::default();

        match nickname {
            None => {}
            Some(None) => changes.nickname = Some(None),
            Some(Some(raw)) => match Nickname::new(&raw) {
                Ok(nickname) => changes.nickname = Some(Some(nickname)),
                Err(e) => errors.add("nickname", e.to_string()),
            },
        }

        match avatar_url {
            None => {}
            // Blank clears the avatar, like an explicit null
            Some(None) => changes.avatar_url = Some(None),
            Some(Some(raw)) if raw.trim().is_empty() => changes.avatar_url = Some(None),
            Some(Some(raw)) => match AvatarUrl::new(&raw) {
                Ok(url) => changes.avatar_url = Some(Some(url)),
                Err(e) => errors.add("avatar_url", e.to_string()),
            },
        }

        errors.into_result().map(|_| changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryAccountsRepository;

    fn nickname(s: &str) -> Option<Option<String>> {
        Some(Some(s.to_string()))
    }

    #[test]
    fn test_partial_leaves_absent_fields() {
        let changes = UpdateProfileUseCase::<MemoryAccountsRepository>::validate(
            UpdateProfileInput {
                nickname: nickname("Linghu Chong"),
                avatar_url: None,
            },
            UpdateMode::Partial,
        )
        .unwrap();

        assert!(changes.nickname.is_some());
        assert!(changes.avatar_url.is_none());
    }

    #[test]
    fn test_replace_clears_absent_fields() {
        let changes = UpdateProfileUseCase::<MemoryAccountsRepository>::validate(
            UpdateProfileInput {
                nickname: nickname("Linghu Chong"),
                avatar_url: None,
            },
            UpdateMode::Replace,
        )
        .unwrap();

        assert!(matches!(changes.avatar_url, Some(None)));
    }

    #[test]
    fn test_invalid_values_collected() {
        let errors = UpdateProfileUseCase::<MemoryAccountsRepository>::validate(
            UpdateProfileInput {
                nickname: Some(Some("x".repeat(201))),
                avatar_url: Some(Some("ftp://example.com/a.png".to_string())),
            },
            UpdateMode::Partial,
        )
        .unwrap_err();

        assert!(errors.contains("nickname"));
        assert_eq!(errors.get("avatar_url"), Some(&["Enter a valid URL.".to_string()][..]));
    }
}
