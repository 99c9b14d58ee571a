pub mod comment;
pub mod friendship;
pub mod like;
pub mod newsfeed;
pub mod tweet;

pub use comment::Comment;
pub use friendship::Friendship;
pub use like::{Like, LikeTarget};
pub use newsfeed::NewsFeed;
pub use tweet::{Tweet, TweetCounter};
