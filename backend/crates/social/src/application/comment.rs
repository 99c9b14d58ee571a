//! Comment Service

use std::sync::Arc;

use kernel::id::{TweetId, UserId};
use kernel::validation::FieldErrors;

use crate::domain::entity::{Comment, TweetCounter};
use crate::domain::repository::{CommentRepository, TweetRepository};
use crate::domain::value_object::CommentContent;
use crate::error::SocialResult;

pub const TWEET_DOES_NOT_EXIST: &str = "Tweet does not exist.";

pub struct CommentService<R>
where
    R: CommentRepository + TweetRepository,
{
    repo: Arc<R>,
}

impl<R> CommentService<R>
where
    R: CommentRepository + TweetRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Comment on an existing tweet and bump its `comments_count`.
    pub async fn create(
        &self,
        user_id: UserId,
        tweet_id: Option<&str>,
        content: Option<&str>,
    ) -> SocialResult<Comment> {
        let mut errors = FieldErrors::new();

        let tweet_id = errors.require("tweet_id", tweet_id);
        let tweet_id = match tweet_id.map(str::parse::<TweetId>) {
            Some(Ok(id)) if self.repo.find_tweet_by_id(&id).await?.is_some() => Some(id),
            Some(_) => {
                errors.add("tweet_id", TWEET_DOES_NOT_EXIST);
                None
            }
            None => None,
        };

        let content = errors
            .require("content", content)
            .and_then(|raw| match CommentContent::new(raw) {
                Ok(content) => Some(content),
                Err(e) => {
                    errors.add("content", e.to_string());
                    None
                }
            });

        let (Some(tweet_id), Some(content)) = (tweet_id, content) else {
            return Err(errors.into());
        };

        let comment = Comment::new(user_id, tweet_id, content);
        self.repo.create_comment(&comment).await?;
        self.repo
            .bump_tweet_counter(&tweet_id, TweetCounter::Comments)
            .await?;

        tracing::info!(comment_id = %comment.comment_id, tweet_id = %tweet_id, "Comment created");
        Ok(comment)
    }

    /// Oldest first.
    pub async fn list_for_tweet(&self, tweet_id: &TweetId) -> SocialResult<Vec<Comment>> {
        self.repo.list_comments_by_tweet(tweet_id).await
    }
}
