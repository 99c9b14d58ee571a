//! Friendship Entity
//!
//! Directed follow relation: `from_user_id` follows `to_user_id`.

use chrono::{DateTime, Utc};
use kernel::id::{FriendshipId, UserId};

#[derive(Debug, Clone)]
pub struct Friendship {
    pub friendship_id: FriendshipId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn new(from_user_id: UserId, to_user_id: UserId) -> Self {
        Self {
            friendship_id: FriendshipId::new(),
            from_user_id,
            to_user_id,
            created_at: Utc::now(),
        }
    }
}
