//! Tweet Entity

use chrono::{DateTime, Utc};
use kernel::id::{TweetId, UserId};

use crate::domain::value_object::TweetContent;

#[derive(Debug, Clone)]
pub struct Tweet {
    pub tweet_id: TweetId,
    pub user_id: UserId,
    pub content: TweetContent,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Denormalized counters kept on the tweet row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweetCounter {
    Likes,
    Comments,
}

impl Tweet {
    pub fn new(user_id: UserId, content: TweetContent) -> Self {
        Self {
            tweet_id: TweetId::new(),
            user_id,
            content,
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn bump(&mut self, counter: TweetCounter) {
        match counter {
            TweetCounter::Likes => self.likes_count += 1,
            TweetCounter::Comments => self.comments_count += 1,
        }
    }
}
