//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, TweetId, UserId};

use crate::domain::value_object::CommentContent;

#[derive(Debug, Clone)]
pub struct Comment {
    pub comment_id: CommentId,
    pub user_id: UserId,
    pub tweet_id: TweetId,
    pub content: CommentContent,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: UserId, tweet_id: TweetId, content: CommentContent) -> Self {
        Self {
            comment_id: CommentId::new(),
            user_id,
            tweet_id,
            content,
            created_at: Utc::now(),
        }
    }
}
