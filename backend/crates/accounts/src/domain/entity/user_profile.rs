//! User Profile Entity
//!
//! Display data kept apart from credentials. Exactly one per user.

use chrono::{DateTime, Utc};
use kernel::id::{ProfileId, UserId};

use crate::domain::value_object::{AvatarUrl, Nickname};

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub profile_id: ProfileId,
    pub user_id: UserId,
    pub nickname: Option<Nickname>,
    pub avatar_url: Option<AvatarUrl>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-wise change set. `None` leaves a field alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub nickname: Option<Option<Nickname>>,
    pub avatar_url: Option<Option<AvatarUrl>>,
}

impl UserProfile {
    /// Empty profile for a freshly created user.
    pub fn empty_for(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            profile_id: ProfileId::new(),
            user_id,
            nickname: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn apply(&mut self, changes: ProfileChanges) {
        if let Some(nickname) = changes.nickname {
            self.nickname = nickname;
        }
        if let Some(avatar_url) = changes.avatar_url {
            self.avatar_url = avatar_url;
        }
        self.updated_at = Utc::now();
    }
}
