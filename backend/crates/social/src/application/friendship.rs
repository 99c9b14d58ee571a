//! Friendship Service
//!
//! Follow graph reads and writes. Storage is the relational repository, or
//! the column store while `switch_friendship_to_column_store` is on.

use std::sync::Arc;

use kernel::id::UserId;
use platform::column_store::ColumnStore;
use platform::gatekeeper::GateKeeper;

use crate::domain::entity::Friendship;
use crate::domain::repository::FriendshipRepository;
use crate::error::{SocialError, SocialResult};
use crate::infra::columns::ColumnFriendships;

pub const FRIENDSHIP_SWITCH: &str = "switch_friendship_to_column_store";

pub struct FriendshipService<R>
where
    R: FriendshipRepository,
{
    repo: Arc<R>,
    columns: ColumnFriendships,
    gatekeeper: GateKeeper,
}

impl<R> FriendshipService<R>
where
    R: FriendshipRepository,
{
    pub fn new(repo: Arc<R>, columns: ColumnStore, gatekeeper: GateKeeper) -> Self {
        Self {
            repo,
            columns: ColumnFriendships::new(columns),
            gatekeeper,
        }
    }

    fn on_column_store(&self) -> bool {
        self.gatekeeper.is_switch_on(FRIENDSHIP_SWITCH)
    }

    /// Make `from` follow `to`. Following twice returns the existing relation
    /// with `false`.
    pub async fn follow(&self, from: UserId, to: UserId) -> SocialResult<(Friendship, bool)> {
        if from == to {
            return Err(SocialError::FollowSelf);
        }

        let friendship = Friendship::new(from, to);
        let (friendship, created) = if self.on_column_store() {
            self.columns.get_or_create(&friendship)?
        } else {
            self.repo.get_or_create_friendship(&friendship).await?
        };

        if created {
            tracing::info!(from_user_id = %from, to_user_id = %to, "User followed");
        }
        Ok((friendship, created))
    }

    /// Returns whether a relation was removed.
    pub async fn unfollow(&self, from: UserId, to: UserId) -> SocialResult<bool> {
        if from == to {
            return Err(SocialError::UnfollowSelf);
        }

        let deleted = if self.on_column_store() {
            self.columns.delete(&from, &to)?
        } else {
            self.repo.delete_friendship(&from, &to).await?
        };

        if deleted > 0 {
            tracing::info!(from_user_id = %from, to_user_id = %to, "User unfollowed");
        }
        Ok(deleted > 0)
    }

    pub async fn has_followed(&self, from: &UserId, to: &UserId) -> SocialResult<bool> {
        let found = if self.on_column_store() {
            self.columns.find(from, to)?
        } else {
            self.repo.find_friendship(from, to).await?
        };
        Ok(found.is_some())
    }

    /// Who follows `user_id`, newest first.
    pub async fn followers(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>> {
        if self.on_column_store() {
            Ok(self.columns.followers(user_id)?)
        } else {
            self.repo.list_followers(user_id).await
        }
    }

    /// Whom `user_id` follows, newest first.
    pub async fn followings(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>> {
        if self.on_column_store() {
            Ok(self.columns.followings(user_id)?)
        } else {
            self.repo.list_followings(user_id).await
        }
    }

    pub async fn follower_ids(&self, user_id: &UserId) -> SocialResult<Vec<UserId>> {
        Ok(self
            .followers(user_id)
            .await?
            .into_iter()
            .map(|f| f.from_user_id)
            .collect())
    }

    pub async fn following_ids(&self, user_id: &UserId) -> SocialResult<Vec<UserId>> {
        Ok(self
            .followings(user_id)
            .await?
            .into_iter()
            .map(|f| f.to_user_id)
            .collect())
    }
}
