//! Application Layer
//!
//! Services over the social repositories, the column store and the
//! feature switches that choose between them.

pub mod comment;
pub mod friendship;
pub mod like;
pub mod newsfeed;
pub mod tweet;

// Re-exports
pub use comment::CommentService;
pub use friendship::{FRIENDSHIP_SWITCH, FriendshipService};
pub use like::LikeService;
pub use newsfeed::{NEWSFEED_SWITCH, NewsFeedService};
pub use tweet::TweetService;
