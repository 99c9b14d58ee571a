//! In-Memory Repository Implementations
//!
//! `DashMap`-backed store used by the test harness and local runs without a
//! database. Clones share the same maps.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kernel::id::{CommentId, LikeId, TweetId, UserId};

use crate::domain::entity::{
    Comment, Friendship, Like, LikeTarget, NewsFeed, Tweet, TweetCounter,
};
use crate::domain::repository::{
    CommentRepository, FriendshipRepository, LikeRepository, NewsFeedRepository, TweetRepository,
};
use crate::error::SocialResult;

#[derive(Clone, Default)]
pub struct MemorySocialRepository {
    tweets: Arc<DashMap<TweetId, Tweet>>,
    comments: Arc<DashMap<CommentId, Comment>>,
    likes: Arc<DashMap<LikeId, Like>>,
    /// (user, target) -> like, guards uniqueness
    like_index: Arc<DashMap<(UserId, LikeTarget), LikeId>>,
    friendships: Arc<DashMap<(UserId, UserId), Friendship>>,
    newsfeeds: Arc<DashMap<(UserId, TweetId), NewsFeed>>,
}

impl MemorySocialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut items: Vec<Friendship>) -> Vec<Friendship> {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.friendship_id.cmp(&a.friendship_id))
    });
    items
}

impl TweetRepository for MemorySocialRepository {
    async fn create_tweet(&self, tweet: &Tweet) -> SocialResult<()> {
        self.tweets.insert(tweet.tweet_id, tweet.clone());
        Ok(())
    }

    async fn find_tweet_by_id(&self, tweet_id: &TweetId) -> SocialResult<Option<Tweet>> {
        Ok(self.tweets.get(tweet_id).map(|t| t.clone()))
    }

    async fn find_tweets_by_ids(&self, tweet_ids: &[TweetId]) -> SocialResult<Vec<Tweet>> {
        Ok(tweet_ids
            .iter()
            .filter_map(|id| self.tweets.get(id).map(|t| t.clone()))
            .collect())
    }

    async fn list_tweets_by_user(&self, user_id: &UserId) -> SocialResult<Vec<Tweet>> {
        let mut tweets: Vec<Tweet> = self
            .tweets
            .iter()
            .filter(|t| &t.user_id == user_id)
            .map(|t| t.clone())
            .collect();
        tweets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.tweet_id.cmp(&a.tweet_id))
        });
        Ok(tweets)
    }

    async fn bump_tweet_counter(
        &self,
        tweet_id: &TweetId,
        counter: TweetCounter,
    ) -> SocialResult<()> {
        if let Some(mut tweet) = self.tweets.get_mut(tweet_id) {
            tweet.bump(counter);
        }
        Ok(())
    }
}

impl CommentRepository for MemorySocialRepository {
    async fn create_comment(&self, comment: &Comment) -> SocialResult<()> {
        self.comments.insert(comment.comment_id, comment.clone());
        Ok(())
    }

    async fn find_comment_by_id(&self, comment_id: &CommentId) -> SocialResult<Option<Comment>> {
        Ok(self.comments.get(comment_id).map(|c| c.clone()))
    }

    async fn list_comments_by_tweet(&self, tweet_id: &TweetId) -> SocialResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| &c.tweet_id == tweet_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}

impl LikeRepository for MemorySocialRepository {
    async fn get_or_create_like(&self, like: &Like) -> SocialResult<(Like, bool)> {
        match self.like_index.entry((like.user_id, like.target)) {
            Entry::Occupied(existing) => {
                let id = *existing.get();
                drop(existing);
                match self.likes.get(&id) {
                    Some(stored) => Ok((stored.clone(), false)),
                    None => Ok((like.clone(), false)),
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(like.like_id);
                self.likes.insert(like.like_id, like.clone());
                Ok((like.clone(), true))
            }
        }
    }

    async fn find_like(&self, user_id: &UserId, target: &LikeTarget) -> SocialResult<Option<Like>> {
        let Some(id) = self.like_index.get(&(*user_id, *target)).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.likes.get(&id).map(|l| l.clone()))
    }
}

impl FriendshipRepository for MemorySocialRepository {
    async fn get_or_create_friendship(
        &self,
        friendship: &Friendship,
    ) -> SocialResult<(Friendship, bool)> {
        match self
            .friendships
            .entry((friendship.from_user_id, friendship.to_user_id))
        {
            Entry::Occupied(existing) => Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => {
                slot.insert(friendship.clone());
                Ok((friendship.clone(), true))
            }
        }
    }

    async fn find_friendship(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> SocialResult<Option<Friendship>> {
        Ok(self
            .friendships
            .get(&(*from_user_id, *to_user_id))
            .map(|f| f.clone()))
    }

    async fn delete_friendship(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> SocialResult<u64> {
        Ok(self
            .friendships
            .remove(&(*from_user_id, *to_user_id))
            .map_or(0, |_| 1))
    }

    async fn list_followers(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>> {
        Ok(newest_first(
            self.friendships
                .iter()
                .filter(|f| &f.to_user_id == user_id)
                .map(|f| f.clone())
                .collect(),
        ))
    }

    async fn list_followings(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>> {
        Ok(newest_first(
            self.friendships
                .iter()
                .filter(|f| &f.from_user_id == user_id)
                .map(|f| f.clone())
                .collect(),
        ))
    }
}

impl NewsFeedRepository for MemorySocialRepository {
    async fn create_newsfeed(&self, newsfeed: &NewsFeed) -> SocialResult<()> {
        self.newsfeeds
            .entry((newsfeed.user_id, newsfeed.tweet_id))
            .or_insert_with(|| newsfeed.clone());
        Ok(())
    }

    async fn create_newsfeeds(&self, newsfeeds: &[NewsFeed]) -> SocialResult<()> {
        for feed in newsfeeds {
            self.newsfeeds
                .entry((feed.user_id, feed.tweet_id))
                .or_insert_with(|| feed.clone());
        }
        Ok(())
    }

    async fn list_newsfeeds(&self, user_id: &UserId, limit: usize) -> SocialResult<Vec<NewsFeed>> {
        let mut feeds: Vec<NewsFeed> = self
            .newsfeeds
            .iter()
            .filter(|f| &f.user_id == user_id)
            .map(|f| f.clone())
            .collect();
        feeds.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.tweet_id.cmp(&a.tweet_id))
        });
        feeds.truncate(limit);
        Ok(feeds)
    }
}
