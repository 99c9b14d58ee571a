//! Service tests against the in-memory repository, with the column store
//! switches both off and on.

use std::sync::Arc;

use chrono::{Duration, Utc};
use kernel::id::{TweetId, UserId};
use platform::cache::MemoryCache;
use platform::column_store::ColumnStore;
use platform::gatekeeper::GateKeeper;
use uuid::Uuid;

use crate::application::*;
use crate::domain::entity::LikeTarget;
use crate::domain::repository::TweetRepository;
use crate::error::SocialError;
use crate::infra::{COLUMN_TABLES, MemorySocialRepository};

struct Fixture {
    repo: Arc<MemorySocialRepository>,
    columns: ColumnStore,
    gatekeeper: GateKeeper,
}

impl Fixture {
    fn new(column_store: bool) -> Self {
        let columns = ColumnStore::new();
        for table in COLUMN_TABLES {
            columns.create_table(table).unwrap();
        }
        let gatekeeper = GateKeeper::new(MemoryCache::new());
        if column_store {
            gatekeeper.turn_on(FRIENDSHIP_SWITCH);
            gatekeeper.turn_on(NEWSFEED_SWITCH);
        }
        Self {
            repo: Arc::new(MemorySocialRepository::new()),
            columns,
            gatekeeper,
        }
    }

    fn friendships(&self) -> FriendshipService<MemorySocialRepository> {
        FriendshipService::new(self.repo.clone(), self.columns.clone(), self.gatekeeper.clone())
    }

    fn newsfeeds(&self) -> NewsFeedService<MemorySocialRepository> {
        NewsFeedService::new(self.repo.clone(), self.columns.clone(), self.gatekeeper.clone())
    }

    fn tweets(&self) -> TweetService<MemorySocialRepository> {
        TweetService::new(self.repo.clone(), self.columns.clone(), self.gatekeeper.clone())
    }
}

fn field_errors(err: SocialError) -> kernel::FieldErrors {
    match err {
        SocialError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================================
// Friendships
// ============================================================================

async fn follow_round_trip(column_store: bool) {
    let fx = Fixture::new(column_store);
    let friendships = fx.friendships();
    let (linghu, yingying) = (UserId::new(), UserId::new());

    let (first, created) = friendships.follow(linghu, yingying).await.unwrap();
    assert!(created);
    let (again, created) = friendships.follow(linghu, yingying).await.unwrap();
    assert!(!created);
    assert_eq!(first.friendship_id, again.friendship_id);

    assert!(friendships.has_followed(&linghu, &yingying).await.unwrap());
    assert!(!friendships.has_followed(&yingying, &linghu).await.unwrap());
    assert_eq!(friendships.follower_ids(&yingying).await.unwrap(), vec![linghu]);
    assert_eq!(friendships.following_ids(&linghu).await.unwrap(), vec![yingying]);

    assert!(friendships.unfollow(linghu, yingying).await.unwrap());
    assert!(!friendships.unfollow(linghu, yingying).await.unwrap());
    assert!(friendships.follower_ids(&yingying).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_follow_round_trip_relational() {
    follow_round_trip(false).await;
}

#[tokio::test]
async fn test_follow_round_trip_column_store() {
    follow_round_trip(true).await;
}

#[tokio::test]
async fn test_follow_self_is_rejected() {
    let fx = Fixture::new(false);
    let user = UserId::new();
    assert!(matches!(
        fx.friendships().follow(user, user).await,
        Err(SocialError::FollowSelf)
    ));
    assert!(matches!(
        fx.friendships().unfollow(user, user).await,
        Err(SocialError::UnfollowSelf)
    ));
}

#[tokio::test]
async fn test_switch_selects_storage() {
    let fx = Fixture::new(false);
    let (a, b) = (UserId::new(), UserId::new());
    fx.friendships().follow(a, b).await.unwrap();

    fx.gatekeeper.turn_on(FRIENDSHIP_SWITCH);
    assert!(!fx.friendships().has_followed(&a, &b).await.unwrap());

    fx.gatekeeper.turn_off(FRIENDSHIP_SWITCH);
    assert!(fx.friendships().has_followed(&a, &b).await.unwrap());
}

// ============================================================================
// Tweets and NewsFeeds
// ============================================================================

async fn tweet_fans_out(column_store: bool) {
    let fx = Fixture::new(column_store);
    let (author, follower, stranger) = (UserId::new(), UserId::new(), UserId::new());
    fx.friendships().follow(follower, author).await.unwrap();

    let tweet = fx
        .tweets()
        .create(author, Some("  a tweet about swords  "))
        .await
        .unwrap();
    assert_eq!(tweet.content.as_str(), "a tweet about swords");

    for reader in [author, follower] {
        let feed = fx.tweets().newsfeed(&reader, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].1.tweet_id, tweet.tweet_id);
    }
    assert!(fx.tweets().newsfeed(&stranger, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tweet_fans_out_relational() {
    tweet_fans_out(false).await;
}

#[tokio::test]
async fn test_tweet_fans_out_column_store() {
    tweet_fans_out(true).await;
}

async fn newsfeed_newest_first(column_store: bool) {
    let fx = Fixture::new(column_store);
    let reader = UserId::new();
    let start = Utc::now();

    let mut ids = Vec::new();
    for i in 0..4 {
        let tweet_id = TweetId::new();
        fx.newsfeeds()
            .create(reader, tweet_id, start + Duration::seconds(i))
            .await
            .unwrap();
        ids.push(tweet_id);
    }

    let listed: Vec<_> = fx
        .newsfeeds()
        .list_for_user(&reader, 3)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.tweet_id)
        .collect();
    assert_eq!(listed, vec![ids[3], ids[2], ids[1]]);
}

#[tokio::test]
async fn test_newsfeed_newest_first_relational() {
    newsfeed_newest_first(false).await;
}

#[tokio::test]
async fn test_newsfeed_newest_first_column_store() {
    newsfeed_newest_first(true).await;
}

#[tokio::test]
async fn test_tweet_content_rules() {
    let fx = Fixture::new(false);
    let user = UserId::new();

    let errors = field_errors(fx.tweets().create(user, Some("short")).await.unwrap_err());
    assert_eq!(
        errors.get("content").unwrap(),
        ["Ensure this field has at least 6 characters."]
    );

    let errors = field_errors(fx.tweets().create(user, None).await.unwrap_err());
    assert_eq!(errors.get("content").unwrap(), [kernel::validation::REQUIRED]);

    let long = "x".repeat(141);
    assert!(fx.tweets().create(user, Some(&long)).await.is_err());
    assert!(fx.tweets().list_by_user(&user).await.unwrap().is_empty());
}

// ============================================================================
// Comments and Likes
// ============================================================================

#[tokio::test]
async fn test_comment_requires_existing_tweet() {
    let fx = Fixture::new(false);
    let user = UserId::new();
    let comments = CommentService::new(fx.repo.clone());

    let missing = TweetId::new().to_string();
    let errors = field_errors(
        comments
            .create(user, Some(&missing), Some("hello"))
            .await
            .unwrap_err(),
    );
    assert_eq!(
        errors.get("tweet_id").unwrap(),
        [crate::application::comment::TWEET_DOES_NOT_EXIST]
    );

    let tweet = fx.tweets().create(user, Some("a fine tweet")).await.unwrap();
    let tweet_id = tweet.tweet_id.to_string();
    comments
        .create(user, Some(&tweet_id), Some("first"))
        .await
        .unwrap();
    comments
        .create(user, Some(&tweet_id), Some("second"))
        .await
        .unwrap();

    let stored = fx.repo.find_tweet_by_id(&tweet.tweet_id).await.unwrap().unwrap();
    assert_eq!(stored.comments_count, 2);
    assert_eq!(comments.list_for_tweet(&tweet.tweet_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_like_is_idempotent() {
    let fx = Fixture::new(false);
    let (author, fan) = (UserId::new(), UserId::new());
    let tweet = fx.tweets().create(author, Some("likeable tweet")).await.unwrap();
    let likes = LikeService::new(fx.repo.clone());

    let object_id = tweet.tweet_id.to_string();
    let target = likes
        .resolve_target(Some("tweet"), Some(&object_id))
        .await
        .unwrap();
    assert_eq!(target, LikeTarget::Tweet(tweet.tweet_id));

    let (first, created) = likes.like(fan, target).await.unwrap();
    assert!(created);
    let (second, created) = likes.like(fan, target).await.unwrap();
    assert!(!created);
    assert_eq!(first.like_id, second.like_id);
    assert!(likes.has_liked(&fan, &target).await.unwrap());

    let stored = fx.repo.find_tweet_by_id(&tweet.tweet_id).await.unwrap().unwrap();
    assert_eq!(stored.likes_count, 1);
}

#[tokio::test]
async fn test_like_target_validation() {
    let fx = Fixture::new(false);
    let likes = LikeService::new(fx.repo.clone());
    let unknown = Uuid::new_v4().to_string();

    let errors = field_errors(
        likes
            .resolve_target(Some("retweet"), Some(&unknown))
            .await
            .unwrap_err(),
    );
    assert_eq!(
        errors.get("content_type").unwrap(),
        ["\"retweet\" is not a valid choice."]
    );

    let errors = field_errors(
        likes
            .resolve_target(Some("comment"), Some(&unknown))
            .await
            .unwrap_err(),
    );
    assert_eq!(
        errors.get("object_id").unwrap(),
        [crate::application::like::OBJECT_DOES_NOT_EXIST]
    );

    let errors = field_errors(likes.resolve_target(None, None).await.unwrap_err());
    assert!(errors.contains("content_type"));
    assert!(errors.contains("object_id"));
}
