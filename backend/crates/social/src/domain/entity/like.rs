//! Like Entity
//!
//! A like points at either a tweet or a comment. One per user and target.

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, LikeId, TweetId, UserId};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Tweet(TweetId),
    Comment(CommentId),
}

impl LikeTarget {
    pub const TWEET: &'static str = "tweet";
    pub const COMMENT: &'static str = "comment";

    /// Build from the `content_type` / `object_id` pair used on the wire and
    /// in storage.
    pub fn from_parts(content_type: &str, object_id: Uuid) -> Option<Self> {
        match content_type {
            Self::TWEET => Some(LikeTarget::Tweet(TweetId::from_uuid(object_id))),
            Self::COMMENT => Some(LikeTarget::Comment(CommentId::from_uuid(object_id))),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            LikeTarget::Tweet(_) => Self::TWEET,
            LikeTarget::Comment(_) => Self::COMMENT,
        }
    }

    pub fn object_id(&self) -> Uuid {
        match self {
            LikeTarget::Tweet(id) => *id.as_uuid(),
            LikeTarget::Comment(id) => *id.as_uuid(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Like {
    pub like_id: LikeId,
    pub user_id: UserId,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(user_id: UserId, target: LikeTarget) -> Self {
        Self {
            like_id: LikeId::new(),
            user_id,
            target,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parts() {
        let id = Uuid::new_v4();
        let target = LikeTarget::from_parts("comment", id).unwrap();
        assert_eq!(target.content_type(), "comment");
        assert_eq!(target.object_id(), id);
        assert!(LikeTarget::from_parts("retweet", id).is_none());
    }
}
