//! NewsFeed Entity
//!
//! One row per (reader, tweet). `created_at` copies the tweet's timestamp so
//! that feeds sort by tweet time.

use chrono::{DateTime, Utc};
use kernel::id::{TweetId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFeed {
    pub user_id: UserId,
    pub tweet_id: TweetId,
    pub created_at: DateTime<Utc>,
}
