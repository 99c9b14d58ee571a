//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, FriendshipId, LikeId, TweetId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    Comment, Friendship, Like, LikeTarget, NewsFeed, Tweet, TweetCounter,
};
use crate::domain::repository::{
    CommentRepository, FriendshipRepository, LikeRepository, NewsFeedRepository, TweetRepository,
};
use crate::domain::value_object::{CommentContent, TweetContent};
use crate::error::{SocialError, SocialResult};

const TWEET_COLUMNS: &str = r#"
    tweet_id,
    user_id,
    content,
    likes_count,
    comments_count,
    created_at
"#;

const FRIENDSHIP_COLUMNS: &str = r#"
    friendship_id,
    from_user_id,
    to_user_id,
    created_at
"#;

/// PostgreSQL-backed social repository
#[derive(Clone)]
pub struct PgSocialRepository {
    pool: PgPool,
}

impl PgSocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Tweet Repository Implementation
// ============================================================================

impl TweetRepository for PgSocialRepository {
    async fn create_tweet(&self, tweet: &Tweet) -> SocialResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tweets (
                tweet_id,
                user_id,
                content,
                likes_count,
                comments_count,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tweet.tweet_id.as_uuid())
        .bind(tweet.user_id.as_uuid())
        .bind(tweet.content.as_str())
        .bind(tweet.likes_count)
        .bind(tweet.comments_count)
        .bind(tweet.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_tweet_by_id(&self, tweet_id: &TweetId) -> SocialResult<Option<Tweet>> {
        let row = sqlx::query_as::<_, TweetRow>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE tweet_id = $1"
        ))
        .bind(tweet_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TweetRow::into_tweet))
    }

    async fn find_tweets_by_ids(&self, tweet_ids: &[TweetId]) -> SocialResult<Vec<Tweet>> {
        if tweet_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = tweet_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query_as::<_, TweetRow>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE tweet_id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TweetRow::into_tweet).collect())
    }

    async fn list_tweets_by_user(&self, user_id: &UserId) -> SocialResult<Vec<Tweet>> {
        let rows = sqlx::query_as::<_, TweetRow>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE user_id = $1 ORDER BY created_at DESC, tweet_id DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TweetRow::into_tweet).collect())
    }

    async fn bump_tweet_counter(
        &self,
        tweet_id: &TweetId,
        counter: TweetCounter,
    ) -> SocialResult<()> {
        // Single-statement increment; concurrent bumps do not lose updates.
        let query = match counter {
            TweetCounter::Likes => {
                "UPDATE tweets SET likes_count = likes_count + 1 WHERE tweet_id = $1"
            }
            TweetCounter::Comments => {
                "UPDATE tweets SET comments_count = comments_count + 1 WHERE tweet_id = $1"
            }
        };

        sqlx::query(query)
            .bind(tweet_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgSocialRepository {
    async fn create_comment(&self, comment: &Comment) -> SocialResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (comment_id, user_id, tweet_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.comment_id.as_uuid())
        .bind(comment.user_id.as_uuid())
        .bind(comment.tweet_id.as_uuid())
        .bind(comment.content.as_str())
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_comment_by_id(&self, comment_id: &CommentId) -> SocialResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT comment_id, user_id, tweet_id, content, created_at
            FROM comments
            WHERE comment_id = $1
            "#,
        )
        .bind(comment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_comments_by_tweet(&self, tweet_id: &TweetId) -> SocialResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT comment_id, user_id, tweet_id, content, created_at
            FROM comments
            WHERE tweet_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(tweet_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }
}

// ============================================================================
// Like Repository Implementation
// ============================================================================

impl LikeRepository for PgSocialRepository {
    async fn get_or_create_like(&self, like: &Like) -> SocialResult<(Like, bool)> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (like_id, user_id, content_type, object_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, content_type, object_id) DO NOTHING
            "#,
        )
        .bind(like.like_id.as_uuid())
        .bind(like.user_id.as_uuid())
        .bind(like.target.content_type())
        .bind(like.target.object_id())
        .bind(like.created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            return Ok((like.clone(), true));
        }

        let existing = self
            .find_like(&like.user_id, &like.target)
            .await?
            .ok_or_else(|| SocialError::Internal("like vanished after conflict".into()))?;
        Ok((existing, false))
    }

    async fn find_like(&self, user_id: &UserId, target: &LikeTarget) -> SocialResult<Option<Like>> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT like_id, user_id, content_type, object_id, created_at
            FROM likes
            WHERE user_id = $1 AND content_type = $2 AND object_id = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(target.content_type())
        .bind(target.object_id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LikeRow::into_like).transpose()
    }
}

// ============================================================================
// Friendship Repository Implementation
// ============================================================================

impl FriendshipRepository for PgSocialRepository {
    async fn get_or_create_friendship(
        &self,
        friendship: &Friendship,
    ) -> SocialResult<(Friendship, bool)> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO friendships (friendship_id, from_user_id, to_user_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (from_user_id, to_user_id) DO NOTHING
            "#,
        )
        .bind(friendship.friendship_id.as_uuid())
        .bind(friendship.from_user_id.as_uuid())
        .bind(friendship.to_user_id.as_uuid())
        .bind(friendship.created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            return Ok((friendship.clone(), true));
        }

        let existing = self
            .find_friendship(&friendship.from_user_id, &friendship.to_user_id)
            .await?
            .ok_or_else(|| SocialError::Internal("friendship vanished after conflict".into()))?;
        Ok((existing, false))
    }

    async fn find_friendship(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> SocialResult<Option<Friendship>> {
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            "SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE from_user_id = $1 AND to_user_id = $2"
        ))
        .bind(from_user_id.as_uuid())
        .bind(to_user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FriendshipRow::into_friendship))
    }

    async fn delete_friendship(
        &self,
        from_user_id: &UserId,
        to_user_id: &UserId,
    ) -> SocialResult<u64> {
        let result =
            sqlx::query("DELETE FROM friendships WHERE from_user_id = $1 AND to_user_id = $2")
                .bind(from_user_id.as_uuid())
                .bind(to_user_id.as_uuid())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn list_followers(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>> {
        let rows = sqlx::query_as::<_, FriendshipRow>(&format!(
            "SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE to_user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FriendshipRow::into_friendship).collect())
    }

    async fn list_followings(&self, user_id: &UserId) -> SocialResult<Vec<Friendship>> {
        let rows = sqlx::query_as::<_, FriendshipRow>(&format!(
            "SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE from_user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FriendshipRow::into_friendship).collect())
    }
}

// ============================================================================
// NewsFeed Repository Implementation
// ============================================================================

impl NewsFeedRepository for PgSocialRepository {
    async fn create_newsfeed(&self, newsfeed: &NewsFeed) -> SocialResult<()> {
        sqlx::query(
            r#"
            INSERT INTO newsfeeds (user_id, tweet_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, tweet_id) DO NOTHING
            "#,
        )
        .bind(newsfeed.user_id.as_uuid())
        .bind(newsfeed.tweet_id.as_uuid())
        .bind(newsfeed.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_newsfeeds(&self, newsfeeds: &[NewsFeed]) -> SocialResult<()> {
        if newsfeeds.is_empty() {
            return Ok(());
        }

        let user_ids: Vec<Uuid> = newsfeeds.iter().map(|f| *f.user_id.as_uuid()).collect();
        let tweet_ids: Vec<Uuid> = newsfeeds.iter().map(|f| *f.tweet_id.as_uuid()).collect();
        let created_at: Vec<DateTime<Utc>> = newsfeeds.iter().map(|f| f.created_at).collect();

        sqlx::query(
            r#"
            INSERT INTO newsfeeds (user_id, tweet_id, created_at)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::timestamptz[])
            ON CONFLICT (user_id, tweet_id) DO NOTHING
            "#,
        )
        .bind(&user_ids)
        .bind(&tweet_ids)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_newsfeeds(&self, user_id: &UserId, limit: usize) -> SocialResult<Vec<NewsFeed>> {
        let rows = sqlx::query_as::<_, NewsFeedRow>(
            r#"
            SELECT user_id, tweet_id, created_at
            FROM newsfeeds
            WHERE user_id = $1
            ORDER BY created_at DESC, tweet_id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(NewsFeedRow::into_newsfeed).collect())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct TweetRow {
    tweet_id: Uuid,
    user_id: Uuid,
    content: String,
    likes_count: i64,
    comments_count: i64,
    created_at: DateTime<Utc>,
}

impl TweetRow {
    fn into_tweet(self) -> Tweet {
        Tweet {
            tweet_id: TweetId::from_uuid(self.tweet_id),
            user_id: UserId::from_uuid(self.user_id),
            content: TweetContent::from_db(self.content),
            likes_count: self.likes_count,
            comments_count: self.comments_count,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    user_id: Uuid,
    tweet_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            comment_id: CommentId::from_uuid(self.comment_id),
            user_id: UserId::from_uuid(self.user_id),
            tweet_id: TweetId::from_uuid(self.tweet_id),
            content: CommentContent::from_db(self.content),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    like_id: Uuid,
    user_id: Uuid,
    content_type: String,
    object_id: Uuid,
    created_at: DateTime<Utc>,
}

impl LikeRow {
    fn into_like(self) -> SocialResult<Like> {
        let target = LikeTarget::from_parts(&self.content_type, self.object_id).ok_or_else(|| {
            SocialError::Internal(format!("unknown like content type: {}", self.content_type))
        })?;
        Ok(Like {
            like_id: LikeId::from_uuid(self.like_id),
            user_id: UserId::from_uuid(self.user_id),
            target,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FriendshipRow {
    friendship_id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl FriendshipRow {
    fn into_friendship(self) -> Friendship {
        Friendship {
            friendship_id: FriendshipId::from_uuid(self.friendship_id),
            from_user_id: UserId::from_uuid(self.from_user_id),
            to_user_id: UserId::from_uuid(self.to_user_id),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NewsFeedRow {
    user_id: Uuid,
    tweet_id: Uuid,
    created_at: DateTime<Utc>,
}

impl NewsFeedRow {
    fn into_newsfeed(self) -> NewsFeed {
        NewsFeed {
            user_id: UserId::from_uuid(self.user_id),
            tweet_id: TweetId::from_uuid(self.tweet_id),
            created_at: self.created_at,
        }
    }
}
