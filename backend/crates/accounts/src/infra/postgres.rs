//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ProfileId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Session, User, UserProfile};
use crate::domain::repository::{SessionRepository, UserProfileRepository, UserRepository};
use crate::domain::value_object::{AvatarUrl, Email, Nickname, UserName, UserPassword};
use crate::error::{AccountsError, AccountsResult};

const USER_COLUMNS: &str = r#"
    user_id,
    username,
    email,
    password_hash,
    is_staff,
    is_active,
    last_login_at,
    created_at,
    updated_at
"#;

const PROFILE_COLUMNS: &str = r#"
    profile_id,
    user_id,
    nickname,
    avatar_url,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed accounts repository
#[derive(Clone)]
pub struct PgAccountsRepository {
    pool: PgPool,
}

impl PgAccountsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique violations on `users` become form errors.
fn map_user_write_error(err: sqlx::Error) -> AccountsError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some("users_username_key") => return AccountsError::UsernameTaken,
                Some("users_email_key") => return AccountsError::EmailTaken,
                _ => {}
            }
        }
    }
    AccountsError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountsRepository {
    async fn create_user(&self, user: &User) -> AccountsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                email,
                password_hash,
                is_staff,
                is_active,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.email.as_ref().map(Email::as_str))
        .bind(user.password_hash.as_phc_string())
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AccountsResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_username(&self, username: &UserName) -> AccountsResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn username_exists(&self, username: &UserName) -> AccountsResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &Email) -> AccountsResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn list_users(&self) -> AccountsResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, user_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update_user(&self, user: &User) -> AccountsResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                password_hash = $3,
                is_staff = $4,
                is_active = $5,
                last_login_at = $6,
                updated_at = $7
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_ref().map(Email::as_str))
        .bind(user.password_hash.as_phc_string())
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> AccountsResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// User Profile Repository Implementation
// ============================================================================

impl UserProfileRepository for PgAccountsRepository {
    async fn create_profile(&self, profile: &UserProfile) -> AccountsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                profile_id,
                user_id,
                nickname,
                avatar_url,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.profile_id.as_uuid())
        .bind(profile.user_id.as_uuid())
        .bind(profile.nickname.as_ref().map(Nickname::as_str))
        .bind(profile.avatar_url.as_ref().map(AvatarUrl::as_str))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_profile_by_id(
        &self,
        profile_id: &ProfileId,
    ) -> AccountsResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE profile_id = $1"
        ))
        .bind(profile_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn find_profile_by_user_id(
        &self,
        user_id: &UserId,
    ) -> AccountsResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn update_profile(&self, profile: &UserProfile) -> AccountsResult<()> {
        sqlx::query(
            r#"
            UPDATE user_profiles SET
                nickname = $2,
                avatar_url = $3,
                updated_at = $4
            WHERE profile_id = $1
            "#,
        )
        .bind(profile.profile_id.as_uuid())
        .bind(profile.nickname.as_ref().map(Nickname::as_str))
        .bind(profile.avatar_url.as_ref().map(AvatarUrl::as_str))
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_profile_for_user(&self, user_id: &UserId) -> AccountsResult<()> {
        sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAccountsRepository {
    async fn create_session(&self, session: &Session) -> AccountsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                user_id,
                expires_at_ms,
                client_ip,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(&session.client_ip)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> AccountsResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                expires_at_ms,
                client_ip,
                created_at,
                last_activity_at
            FROM sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn touch_session(&self, session: &Session) -> AccountsResult<()> {
        sqlx::query("UPDATE sessions SET last_activity_at = $2 WHERE session_id = $1")
            .bind(session.session_id)
            .bind(session.last_activity_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> AccountsResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: &UserId) -> AccountsResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired_sessions(&self) -> AccountsResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: Option<String>,
    password_hash: String,
    is_staff: bool,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AccountsResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: UserName::from_db(&self.username),
            email: self.email.map(Email::from_db),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            is_staff: self.is_staff,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    profile_id: Uuid,
    user_id: Uuid,
    nickname: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            profile_id: ProfileId::from_uuid(self.profile_id),
            user_id: UserId::from_uuid(self.user_id),
            nickname: self.nickname.map(Nickname::from_db),
            avatar_url: self.avatar_url.map(AvatarUrl::from_db),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Uuid,
    expires_at_ms: i64,
    client_ip: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            expires_at_ms: self.expires_at_ms,
            client_ip: self.client_ip,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}
