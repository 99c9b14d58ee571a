//! Request and Response DTOs

use accounts::models::{User, UserDto};
use chrono::{DateTime, Utc};
use kernel::id::{CommentId, LikeId, TweetId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::{Comment, Friendship, Like, NewsFeed, Tweet};

// ============================================================================
// Tweets
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateTweetRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TweetListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TweetDto {
    pub id: TweetId,
    pub user: UserDto,
    pub content: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    /// Only present for logged-in viewers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_liked: Option<bool>,
}

impl TweetDto {
    pub fn new(tweet: &Tweet, author: &User, has_liked: Option<bool>) -> Self {
        Self {
            id: tweet.tweet_id,
            user: UserDto::from(author),
            content: tweet.content.as_str().to_string(),
            likes_count: tweet.likes_count,
            comments_count: tweet.comments_count,
            created_at: tweet.created_at,
            has_liked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TweetListResponse {
    pub tweets: Vec<TweetDto>,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentRequest {
    pub tweet_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: CommentId,
    pub tweet_id: TweetId,
    pub user: UserDto,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentDto {
    pub fn new(comment: &Comment, author: &User) -> Self {
        Self {
            id: comment.comment_id,
            tweet_id: comment.tweet_id,
            user: UserDto::from(author),
            content: comment.content.as_str().to_string(),
            created_at: comment.created_at,
        }
    }
}

// ============================================================================
// Likes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateLikeRequest {
    pub content_type: Option<String>,
    pub object_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeDto {
    pub id: LikeId,
    pub user: UserDto,
    pub content_type: &'static str,
    pub object_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl LikeDto {
    pub fn new(like: &Like, user: &User) -> Self {
        Self {
            id: like.like_id,
            user: UserDto::from(user),
            content_type: like.target.content_type(),
            object_id: like.target.object_id(),
            created_at: like.created_at,
        }
    }
}

// ============================================================================
// Friendships
// ============================================================================

/// `user` and `created_at` are omitted when the follow already existed.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub success: bool,
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FollowResponse {
    pub fn duplicate() -> Self {
        Self {
            success: true,
            duplicate: true,
            user: None,
            created_at: None,
        }
    }

    pub fn created(friendship: &Friendship, followed: &User) -> Self {
        Self {
            success: true,
            duplicate: false,
            user: Some(UserDto::from(followed)),
            created_at: Some(friendship.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnfollowResponse {
    pub success: bool,
    pub deleted: bool,
}

/// One side of a relation: the other user and when it started.
#[derive(Debug, Serialize)]
pub struct FriendshipDto {
    pub user: UserDto,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FriendshipListResponse {
    pub results: Vec<FriendshipDto>,
}

// ============================================================================
// NewsFeeds
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NewsFeedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NewsFeedDto {
    pub created_at: DateTime<Utc>,
    pub tweet: TweetDto,
}

impl NewsFeedDto {
    pub fn new(feed: &NewsFeed, tweet: TweetDto) -> Self {
        Self {
            created_at: feed.created_at,
            tweet,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewsFeedListResponse {
    pub newsfeeds: Vec<NewsFeedDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_follow_omits_user() {
        let json = serde_json::to_value(FollowResponse::duplicate()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "duplicate": true }));
    }

    #[test]
    fn test_like_request_accepts_missing_fields() {
        let req: CreateLikeRequest = serde_json::from_str(r#"{"content_type":"tweet"}"#).unwrap();
        assert_eq!(req.content_type.as_deref(), Some("tweet"));
        assert!(req.object_id.is_none());
    }
}
