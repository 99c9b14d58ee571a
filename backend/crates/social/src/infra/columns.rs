//! Column Store Tables
//!
//! Friendships and newsfeeds mirrored into the wide-column store. Row keys
//! lead with the owning user and then the creation time in microseconds, so
//! a reverse prefix scan yields newest first. The other party's id closes
//! the key to keep rows written in the same microsecond apart.
//!
//! | table        | row key                         |
//! |--------------|---------------------------------|
//! | `followings` | `from_user_id:created_at:to`    |
//! | `followers`  | `to_user_id:created_at:from`    |
//! | `newsfeeds`  | `user_id:created_at:tweet_id`   |

use chrono::{DateTime, Utc};
use kernel::id::{FriendshipId, TweetId, UserId};
use platform::column_store::{ColumnStore, ColumnStoreError, Columns, RowKey, columns};

use crate::domain::entity::{Friendship, NewsFeed};

pub const FOLLOWINGS_TABLE: &str = "followings";
pub const FOLLOWERS_TABLE: &str = "followers";
pub const NEWSFEEDS_TABLE: &str = "newsfeeds";

/// Every table the social crate expects to exist when its switches are on.
pub const COLUMN_TABLES: [&str; 3] = [FOLLOWINGS_TABLE, FOLLOWERS_TABLE, NEWSFEEDS_TABLE];

fn micros(at: DateTime<Utc>) -> u64 {
    at.timestamp_micros().max(0) as u64
}

fn column<'a>(row: &'a Columns, name: &str) -> Option<&'a str> {
    row.get(name).map(String::as_str)
}

fn parse_time(row: &Columns) -> Option<DateTime<Utc>> {
    let micros = column(row, "created_at")?.parse::<i64>().ok()?;
    DateTime::from_timestamp_micros(micros)
}

// ============================================================================
// Friendships
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColumnFriendships {
    store: ColumnStore,
}

impl ColumnFriendships {
    pub fn new(store: ColumnStore) -> Self {
        Self { store }
    }

    fn following_key(f: &Friendship) -> RowKey {
        RowKey::new()
            .field(f.from_user_id.to_string())
            .int(micros(f.created_at))
            .field(f.to_user_id.to_string())
    }

    fn follower_key(f: &Friendship) -> RowKey {
        RowKey::new()
            .field(f.to_user_id.to_string())
            .int(micros(f.created_at))
            .field(f.from_user_id.to_string())
    }

    fn to_columns(f: &Friendship) -> Columns {
        columns([
            ("friendship_id", f.friendship_id.to_string()),
            ("from_user_id", f.from_user_id.to_string()),
            ("to_user_id", f.to_user_id.to_string()),
            ("created_at", micros(f.created_at).to_string()),
        ])
    }

    fn from_columns(row: &Columns) -> Option<Friendship> {
        Some(Friendship {
            friendship_id: column(row, "friendship_id")?.parse::<FriendshipId>().ok()?,
            from_user_id: column(row, "from_user_id")?.parse::<UserId>().ok()?,
            to_user_id: column(row, "to_user_id")?.parse::<UserId>().ok()?,
            created_at: parse_time(row)?,
        })
    }

    fn scan(
        &self,
        table: &str,
        user_id: &UserId,
    ) -> Result<Vec<Friendship>, ColumnStoreError> {
        let prefix = RowKey::new().field(user_id.to_string()).prefix();
        let rows = self.store.scan(table, &prefix, None, true)?;
        Ok(rows
            .iter()
            .filter_map(|(key, row)| {
                let parsed = Self::from_columns(row);
                if parsed.is_none() {
                    tracing::warn!(table, row_key = %key, "Skipping malformed friendship row");
                }
                parsed
            })
            .collect())
    }

    pub fn find(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> Result<Option<Friendship>, ColumnStoreError> {
        Ok(self
            .scan(FOLLOWINGS_TABLE, from_user_id)?
            .into_iter()
            .find(|f| &f.to_user_id == to_user_id))
    }

    /// The followings row is checked and written under one table lock, so
    /// concurrent follows of the same pair create it once.
    pub fn get_or_create(
        &self,
        friendship: &Friendship,
    ) -> Result<(Friendship, bool), ColumnStoreError> {
        let prefix = RowKey::new()
            .field(friendship.from_user_id.to_string())
            .prefix();
        let to_user_id = friendship.to_user_id.to_string();
        let row = Self::to_columns(friendship);

        let existing = self.store.put_unless(
            FOLLOWINGS_TABLE,
            &prefix,
            |columns| column(columns, "to_user_id") == Some(to_user_id.as_str()),
            Self::following_key(friendship).as_str(),
            row.clone(),
        )?;
        if let Some(existing) = existing {
            let existing = Self::from_columns(&existing).unwrap_or_else(|| {
                tracing::warn!(
                    from_user_id = %friendship.from_user_id,
                    to_user_id = %friendship.to_user_id,
                    "Malformed followings row, keeping it"
                );
                friendship.clone()
            });
            return Ok((existing, false));
        }

        self.store
            .put(FOLLOWERS_TABLE, Self::follower_key(friendship).as_str(), row)?;
        Ok((friendship.clone(), true))
    }

    pub fn delete(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> Result<u64, ColumnStoreError> {
        let mut deleted = 0;
        for f in self
            .scan(FOLLOWINGS_TABLE, from_user_id)?
            .into_iter()
            .filter(|f| &f.to_user_id == to_user_id)
        {
            if self
                .store
                .delete(FOLLOWINGS_TABLE, Self::following_key(&f).as_str())?
            {
                deleted += 1;
            }
            self.store
                .delete(FOLLOWERS_TABLE, Self::follower_key(&f).as_str())?;
        }
        Ok(deleted)
    }

    /// Newest first.
    pub fn followers(&self, user_id: &UserId) -> Result<Vec<Friendship>, ColumnStoreError> {
        self.scan(FOLLOWERS_TABLE, user_id)
    }

    /// Newest first.
    pub fn followings(&self, user_id: &UserId) -> Result<Vec<Friendship>, ColumnStoreError> {
        self.scan(FOLLOWINGS_TABLE, user_id)
    }
}

// ============================================================================
// Newsfeeds
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColumnNewsFeeds {
    store: ColumnStore,
}

impl ColumnNewsFeeds {
    pub fn new(store: ColumnStore) -> Self {
        Self { store }
    }

    fn key(feed: &NewsFeed) -> RowKey {
        RowKey::new()
            .field(feed.user_id.to_string())
            .int(micros(feed.created_at))
            .field(feed.tweet_id.to_string())
    }

    fn from_columns(row: &Columns) -> Option<NewsFeed> {
        Some(NewsFeed {
            user_id: column(row, "user_id")?.parse::<UserId>().ok()?,
            tweet_id: column(row, "tweet_id")?.parse::<TweetId>().ok()?,
            created_at: parse_time(row)?,
        })
    }

    pub fn create(&self, feed: &NewsFeed) -> Result<(), ColumnStoreError> {
        self.store.put(
            NEWSFEEDS_TABLE,
            Self::key(feed).as_str(),
            columns([
                ("user_id", feed.user_id.to_string()),
                ("tweet_id", feed.tweet_id.to_string()),
                ("created_at", micros(feed.created_at).to_string()),
            ]),
        )
    }

    pub fn create_many(&self, feeds: &[NewsFeed]) -> Result<(), ColumnStoreError> {
        feeds.iter().try_for_each(|feed| self.create(feed))
    }

    /// Newest first, at most `limit`.
    pub fn list(&self, user_id: &UserId, limit: usize) -> Result<Vec<NewsFeed>, ColumnStoreError> {
        let prefix = RowKey::new().field(user_id.to_string()).prefix();
        let rows = self.store.scan(NEWSFEEDS_TABLE, &prefix, Some(limit), true)?;
        Ok(rows
            .iter()
            .filter_map(|(_, row)| Self::from_columns(row))
            .collect())
    }
}
