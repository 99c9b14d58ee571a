//! Value Objects

pub mod content;

pub use content::{CommentContent, ContentError, TweetContent};
