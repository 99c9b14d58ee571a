//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Comment, Friendship, Like, LikeTarget, NewsFeed, Tweet, TweetCounter};
pub use repository::{
    CommentRepository, FriendshipRepository, LikeRepository, NewsFeedRepository, SocialStore,
    TweetRepository,
};
