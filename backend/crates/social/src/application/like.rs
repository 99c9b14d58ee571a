//! Like Service

use std::sync::Arc;

use kernel::id::UserId;
use kernel::validation::FieldErrors;
use uuid::Uuid;

use crate::domain::entity::{Like, LikeTarget, TweetCounter};
use crate::domain::repository::{CommentRepository, LikeRepository, TweetRepository};
use crate::error::SocialResult;

pub const OBJECT_DOES_NOT_EXIST: &str = "Object does not exist.";

pub struct LikeService<R>
where
    R: LikeRepository + TweetRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> LikeService<R>
where
    R: LikeRepository + TweetRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn target_exists(&self, target: &LikeTarget) -> SocialResult<bool> {
        Ok(match target {
            LikeTarget::Tweet(id) => self.repo.find_tweet_by_id(id).await?.is_some(),
            LikeTarget::Comment(id) => self.repo.find_comment_by_id(id).await?.is_some(),
        })
    }

    /// Parse and check a `content_type` / `object_id` pair from a request.
    pub async fn resolve_target(
        &self,
        content_type: Option<&str>,
        object_id: Option<&str>,
    ) -> SocialResult<LikeTarget> {
        let mut errors = FieldErrors::new();
        let content_type = errors.require("content_type", content_type);
        let object_id = errors.require("object_id", object_id);

        if let Some(kind) = content_type {
            if kind != LikeTarget::TWEET && kind != LikeTarget::COMMENT {
                errors.add("content_type", format!("\"{kind}\" is not a valid choice."));
            }
        }

        let target = match (content_type, object_id) {
            (Some(kind), Some(raw)) if errors.is_empty() => Uuid::parse_str(raw.trim())
                .ok()
                .and_then(|id| LikeTarget::from_parts(kind, id)),
            _ => None,
        };

        match target {
            Some(target) if self.target_exists(&target).await? => Ok(target),
            Some(_) => Err(FieldErrors::single("object_id", OBJECT_DOES_NOT_EXIST).into()),
            None if errors.is_empty() => {
                Err(FieldErrors::single("object_id", OBJECT_DOES_NOT_EXIST).into())
            }
            None => Err(errors.into()),
        }
    }

    /// Like `target` once. Returns the stored like and whether it is new;
    /// a tweet's `likes_count` only moves on creation.
    pub async fn like(&self, user_id: UserId, target: LikeTarget) -> SocialResult<(Like, bool)> {
        let (like, created) = self
            .repo
            .get_or_create_like(&Like::new(user_id, target))
            .await?;

        if created {
            if let LikeTarget::Tweet(tweet_id) = target {
                self.repo
                    .bump_tweet_counter(&tweet_id, TweetCounter::Likes)
                    .await?;
            }
            tracing::info!(
                user_id = %user_id,
                content_type = target.content_type(),
                object_id = %target.object_id(),
                "Like created"
            );
        }
        Ok((like, created))
    }

    pub async fn has_liked(&self, user_id: &UserId, target: &LikeTarget) -> SocialResult<bool> {
        Ok(self.repo.find_like(user_id, target).await?.is_some())
    }
}
