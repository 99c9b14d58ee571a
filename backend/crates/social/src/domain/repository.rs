//! Repository Traits
//!
//! Relational persistence for the social graph and content. The column
//! store paths for friendships and newsfeeds live in the application
//! services, not here.

use kernel::id::{CommentId, TweetId, UserId};

use crate::domain::entity::{
    Comment, Friendship, Like, LikeTarget, NewsFeed, Tweet, TweetCounter,
};
use crate::error::SocialResult;

#[trait_variant::make(TweetRepository: Send)]
pub trait LocalTweetRepository {
    async fn create_tweet(&self, tweet: &Tweet) -> SocialResult<()>;

    async fn find_tweet_by_id(&self, tweet_id: &TweetId) -> SocialResult<Option<Tweet>>;

    /// Unknown ids are skipped; order is unspecified.
    async fn find_tweets_by_ids(&self, tweet_ids: &[TweetId]) -> SocialResult<Vec<Tweet>>;

    /// Newest first.
    async fn list_tweets_by_user(&self, user_id: &UserId) -> SocialResult<Vec<Tweet>>;

    async fn bump_tweet_counter(&self, tweet_id: &TweetId, counter: TweetCounter)
    -> SocialResult<()>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> SocialResult<()>;

    async fn find_comment_by_id(&self, comment_id: &CommentId) -> SocialResult<Option<Comment>>;

    /// Oldest first.
    async fn list_comments_by_tweet(&self, tweet_id: &TweetId) -> SocialResult<Vec<Comment>>;
}

#[trait_variant::make(LikeRepository: Send)]
pub trait LocalLikeRepository {
    /// Insert `like` unless the user already likes its target. Returns the
    /// stored like and whether it was created.
    async fn get_or_create_like(&self, like: &Like) -> SocialResult<(Like, bool)>;

    async fn find_like(&self, user_id: &UserId, target: &LikeTarget) -> SocialResult<Option<Like>>;
}

#[trait_variant::make(FriendshipRepository: Send)]
pub trait LocalFriendshipRepository {
    /// Insert unless the pair already exists. Returns the stored relation and
    /// whether it was created.
    async fn get_or_create_friendship(
        &self,
        friendship: &Friendship,
    ) -> SocialResult<(Friendship, bool)>;

    async fn find_friendship(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> SocialResult<Option<Friendship>>;

    /// Returns the number of rows removed.
    async fn delete_friendship(&self, from_user_id: &UserId, to_user_id: &UserId)
    -> SocialResult<u64>;

    /// Relations pointing at `user_id`, newest first.
    async fn list_followers(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>>;

    /// Relations starting at `user_id`, newest first.
    async fn list_followings(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>>;
}

#[trait_variant::make(NewsFeedRepository: Send)]
pub trait LocalNewsFeedRepository {
    async fn create_newsfeed(&self, newsfeed: &NewsFeed) -> SocialResult<()>;

    /// Fan-out insert. Existing (user, tweet) pairs are left alone.
    async fn create_newsfeeds(&self, newsfeeds: &[NewsFeed]) -> SocialResult<()>;

    /// Newest first, at most `limit`.
    async fn list_newsfeeds(&self, user_id: &UserId, limit: usize) -> SocialResult<Vec<NewsFeed>>;
}

/// Everything the social HTTP layer needs from storage.
pub trait SocialStore:
    TweetRepository
    + CommentRepository
    + LikeRepository
    + FriendshipRepository
    + NewsFeedRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> SocialStore for T where
    T: TweetRepository
        + CommentRepository
        + LikeRepository
        + FriendshipRepository
        + NewsFeedRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
