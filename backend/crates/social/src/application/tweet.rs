//! Tweet Service

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::UserId;
use kernel::validation::FieldErrors;
use platform::column_store::ColumnStore;
use platform::gatekeeper::GateKeeper;

use crate::application::newsfeed::NewsFeedService;
use crate::domain::entity::{NewsFeed, Tweet};
use crate::domain::repository::SocialStore;
use crate::domain::value_object::TweetContent;
use crate::error::SocialResult;

pub struct TweetService<R>
where
    R: SocialStore,
{
    repo: Arc<R>,
    newsfeeds: NewsFeedService<R>,
}

impl<R> TweetService<R>
where
    R: SocialStore,
{
    pub fn new(repo: Arc<R>, columns: ColumnStore, gatekeeper: GateKeeper) -> Self {
        Self {
            newsfeeds: NewsFeedService::new(repo.clone(), columns, gatekeeper),
            repo,
        }
    }

    /// Validate, store and fan out a new tweet.
    pub async fn create(&self, user_id: UserId, content: Option<&str>) -> SocialResult<Tweet> {
        let mut errors = FieldErrors::new();
        let content = errors
            .require("content", content)
            .and_then(|raw| match TweetContent::new(raw) {
                Ok(content) => Some(content),
                Err(e) => {
                    errors.add("content", e.to_string());
                    None
                }
            });
        let Some(content) = content else {
            return Err(errors.into());
        };

        let tweet = Tweet::new(user_id, content);
        self.repo.create_tweet(&tweet).await?;
        self.newsfeeds.fanout_to_followers(&tweet).await?;

        tracing::info!(tweet_id = %tweet.tweet_id, user_id = %user_id, "Tweet created");
        Ok(tweet)
    }

    /// Newest first.
    pub async fn list_by_user(&self, user_id: &UserId) -> SocialResult<Vec<Tweet>> {
        self.repo.list_tweets_by_user(user_id).await
    }

    /// Feed entries of `user_id` joined with their tweets, newest first.
    /// Entries whose tweet has gone are dropped.
    pub async fn newsfeed(&self, user_id: &UserId, limit: usize) -> SocialResult<Vec<(NewsFeed, Tweet)>> {
        let feeds = self.newsfeeds.list_for_user(user_id, limit).await?;
        let ids: Vec<_> = feeds.iter().map(|f| f.tweet_id).collect();

        let mut tweets: HashMap<_, _> = self
            .repo
            .find_tweets_by_ids(&ids)
            .await?
            .into_iter()
            .map(|t| (t.tweet_id, t))
            .collect();

        Ok(feeds
            .into_iter()
            .filter_map(|feed| tweets.remove(&feed.tweet_id).map(|tweet| (feed, tweet)))
            .collect())
    }
}
