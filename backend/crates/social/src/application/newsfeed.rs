//! NewsFeed Service
//!
//! Push model: a new tweet is written into the feed of its author and of
//! every follower at creation time. Storage is relational, or the column
//! store while `switch_newsfeed_to_column_store` is on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{TweetId, UserId};
use platform::column_store::ColumnStore;
use platform::gatekeeper::GateKeeper;

use crate::application::friendship::FriendshipService;
use crate::domain::entity::{NewsFeed, Tweet};
use crate::domain::repository::{FriendshipRepository, NewsFeedRepository};
use crate::error::SocialResult;
use crate::infra::columns::ColumnNewsFeeds;

pub const NEWSFEED_SWITCH: &str = "switch_newsfeed_to_column_store";

pub const DEFAULT_FEED_LIMIT: usize = 20;
pub const MAX_FEED_LIMIT: usize = 100;

pub struct NewsFeedService<R>
where
    R: NewsFeedRepository + FriendshipRepository,
{
    repo: Arc<R>,
    columns: ColumnStore,
    feeds: ColumnNewsFeeds,
    gatekeeper: GateKeeper,
}

impl<R> NewsFeedService<R>
where
    R: NewsFeedRepository + FriendshipRepository,
{
    pub fn new(repo: Arc<R>, columns: ColumnStore, gatekeeper: GateKeeper) -> Self {
        Self {
            repo,
            feeds: ColumnNewsFeeds::new(columns.clone()),
            columns,
            gatekeeper,
        }
    }

    fn on_column_store(&self) -> bool {
        self.gatekeeper.is_switch_on(NEWSFEED_SWITCH)
    }

    pub async fn create(
        &self,
        user_id: UserId,
        tweet_id: TweetId,
        created_at: DateTime<Utc>,
    ) -> SocialResult<NewsFeed> {
        let feed = NewsFeed {
            user_id,
            tweet_id,
            created_at,
        };
        if self.on_column_store() {
            self.feeds.create(&feed)?;
        } else {
            self.repo.create_newsfeed(&feed).await?;
        }
        Ok(feed)
    }

    /// Deliver `tweet` to its author and every follower. Returns the number
    /// of feeds written.
    pub async fn fanout_to_followers(&self, tweet: &Tweet) -> SocialResult<usize> {
        let friendships =
            FriendshipService::new(self.repo.clone(), self.columns.clone(), self.gatekeeper.clone());

        let mut readers = vec![tweet.user_id];
        readers.extend(
            friendships
                .follower_ids(&tweet.user_id)
                .await?
                .into_iter()
                .filter(|id| id != &tweet.user_id),
        );

        let feeds: Vec<NewsFeed> = readers
            .into_iter()
            .map(|user_id| NewsFeed {
                user_id,
                tweet_id: tweet.tweet_id,
                created_at: tweet.created_at,
            })
            .collect();

        if self.on_column_store() {
            self.feeds.create_many(&feeds)?;
        } else {
            self.repo.create_newsfeeds(&feeds).await?;
        }

        tracing::debug!(tweet_id = %tweet.tweet_id, feeds = feeds.len(), "Tweet fanned out");
        Ok(feeds.len())
    }

    /// Newest first. `limit` is clamped to `1..=MAX_FEED_LIMIT`.
    pub async fn list_for_user(&self, user_id: &UserId, limit: usize) -> SocialResult<Vec<NewsFeed>> {
        let limit = limit.clamp(1, MAX_FEED_LIMIT);
        if self.on_column_store() {
            Ok(self.feeds.list(user_id, limit)?)
        } else {
            self.repo.list_newsfeeds(user_id, limit).await
        }
    }
}
