//! Shared test harness
//!
//! [`TestCase`] wires the whole API over in-memory stores, turns both column
//! store switches on and creates the column tables. Fixture helpers write
//! straight to the stores; [`TestClient`] talks to the router in-process.

pub mod client;

use std::sync::{Arc, OnceLock};

use accounts::AccountsAppState;
use accounts::application::StartSessionUseCase;
use accounts::domain::repository::{UserProfileRepository, UserRepository};
use accounts::models::{Email, RawPassword, User, UserName, UserPassword, UserProfile};
use accounts::{AccountsConfig, MemoryAccountsRepository};
use axum::Router;
use platform::cache::MemoryCache;
use platform::column_store::{ColumnStore, ColumnStoreError};
use platform::gatekeeper::GateKeeper;
use platform::password::HashCost;
use social::application::{FriendshipService, LikeService, NewsFeedService};
use social::domain::repository::{CommentRepository, TweetRepository};
use social::models::{
    Comment, CommentContent, Friendship, Like, LikeTarget, NewsFeed, Tweet, TweetContent,
    TweetCounter,
};
use social::{
    COLUMN_TABLES, FRIENDSHIP_SWITCH, MemorySocialRepository, NEWSFEED_SWITCH, SocialAppState,
};

pub use client::{TestClient, TestResponse};

pub const DEFAULT_PASSWORD: &str = "generic password";
pub const DEFAULT_TWEET_CONTENT: &str = "default tweet content";
pub const DEFAULT_COMMENT_CONTENT: &str = "default comment content";

pub struct TestCase {
    pub accounts: MemoryAccountsRepository,
    pub social: MemorySocialRepository,
    pub config: Arc<AccountsConfig>,
    /// Rate limit counters and feature switches
    pub cache: MemoryCache,
    pub gatekeeper: GateKeeper,
    pub columns: ColumnStore,
    app: Router,
    created_tables: Vec<&'static str>,
    anonymous: OnceLock<TestClient>,
}

impl TestCase {
    pub fn set_up() -> Result<Self, ColumnStoreError> {
        Self::set_up_with(ColumnStore::new())
    }

    /// Set up against an existing column store. If any table cannot be
    /// created, the ones created so far are dropped again.
    pub fn set_up_with(columns: ColumnStore) -> Result<Self, ColumnStoreError> {
        let config = AccountsConfig {
            password_hash_cost: HashCost::Low,
            ..AccountsConfig::development()
        };
        let accounts = MemoryAccountsRepository::new();
        let social = MemorySocialRepository::new();
        let cache = MemoryCache::new();
        let gatekeeper = GateKeeper::new(cache.clone());

        let accounts_state = AccountsAppState::new(accounts.clone(), config, cache.clone());
        let social_state = SocialAppState::new(
            social.clone(),
            accounts.clone(),
            columns.clone(),
            gatekeeper.clone(),
        );

        let mut test_case = Self {
            config: accounts_state.config.clone(),
            app: api::build_router(accounts_state, social_state),
            accounts,
            social,
            cache,
            gatekeeper,
            columns,
            created_tables: Vec::new(),
            anonymous: OnceLock::new(),
        };

        test_case.clear_cache();

        for table in COLUMN_TABLES {
            if let Err(e) = test_case.columns.create_table(table) {
                test_case.tear_down();
                return Err(e);
            }
            test_case.created_tables.push(table);
        }

        Ok(test_case)
    }

    /// Drop the column tables this case created. Safe to call twice.
    pub fn tear_down(&mut self) {
        for table in self.created_tables.drain(..) {
            if let Err(e) = self.columns.drop_table(table) {
                tracing::warn!(table, error = %e, "Column table already gone");
            }
        }
    }

    /// Wipe rate limit counters and switches, then put both column store
    /// switches back on.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.gatekeeper.turn_on(FRIENDSHIP_SWITCH);
        self.gatekeeper.turn_on(NEWSFEED_SWITCH);
    }

    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Fresh client with an empty cookie jar.
    pub fn client(&self) -> TestClient {
        TestClient::new(self.app.clone())
    }

    pub fn anonymous_client(&self) -> &TestClient {
        self.anonymous.get_or_init(|| self.client())
    }

    fn accounts_repo(&self) -> Arc<MemoryAccountsRepository> {
        Arc::new(self.accounts.clone())
    }

    fn social_repo(&self) -> Arc<MemorySocialRepository> {
        Arc::new(self.social.clone())
    }

    // ========================================================================
    // Fixtures
    // ========================================================================

    /// Store a user and its empty profile, normalized the way signup does.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password: Option<&str>,
    ) -> anyhow::Result<User> {
        let email = email.map_or_else(|| format!("{username}@twitter.com"), String::from);
        let password = RawPassword::attempt(password.unwrap_or(DEFAULT_PASSWORD).to_lowercase());
        let password_hash = UserPassword::from_raw(
            &password,
            self.config.pepper(),
            self.config.password_hash_cost,
        )?;

        let user = User::new(
            UserName::from_db(username),
            Some(Email::from_db(email.to_lowercase())),
            password_hash,
        );
        self.accounts.create_user(&user).await?;
        self.accounts
            .create_profile(&UserProfile::empty_for(user.user_id))
            .await?;
        Ok(user)
    }

    pub async fn create_friendship(&self, from: &User, to: &User) -> anyhow::Result<Friendship> {
        let friendships =
            FriendshipService::new(self.social_repo(), self.columns.clone(), self.gatekeeper.clone());
        let (friendship, _) = friendships.follow(from.user_id, to.user_id).await?;
        Ok(friendship)
    }

    /// Store a tweet without fanning it out.
    pub async fn create_tweet(&self, user: &User, content: Option<&str>) -> anyhow::Result<Tweet> {
        let content = TweetContent::new(content.unwrap_or(DEFAULT_TWEET_CONTENT))?;
        let tweet = Tweet::new(user.user_id, content);
        self.social.create_tweet(&tweet).await?;
        Ok(tweet)
    }

    pub async fn create_comment(
        &self,
        user: &User,
        tweet: &Tweet,
        content: Option<&str>,
    ) -> anyhow::Result<Comment> {
        let content = CommentContent::new(content.unwrap_or(DEFAULT_COMMENT_CONTENT))?;
        let comment = Comment::new(user.user_id, tweet.tweet_id, content);
        self.social.create_comment(&comment).await?;
        self.social
            .bump_tweet_counter(&tweet.tweet_id, TweetCounter::Comments)
            .await?;
        Ok(comment)
    }

    pub async fn create_newsfeed(&self, user: &User, tweet: &Tweet) -> anyhow::Result<NewsFeed> {
        let newsfeeds =
            NewsFeedService::new(self.social_repo(), self.columns.clone(), self.gatekeeper.clone());
        Ok(newsfeeds
            .create(user.user_id, tweet.tweet_id, tweet.created_at)
            .await?)
    }

    /// Get-or-create.
    pub async fn create_like(&self, user: &User, target: LikeTarget) -> anyhow::Result<Like> {
        let (like, _) = LikeService::new(self.social_repo())
            .like(user.user_id, target)
            .await?;
        Ok(like)
    }

    /// A user plus a client already carrying a valid session cookie.
    pub async fn create_user_and_client(&self, username: &str) -> anyhow::Result<(User, TestClient)> {
        let user = self.create_user(username, None, None).await?;
        let token = StartSessionUseCase::new(self.accounts_repo(), self.config.clone())
            .execute(&user, None)
            .await?;

        let client = self.client();
        client.set_cookie(&self.config.session_cookie_name, token);
        Ok((user, client))
    }
}

impl Drop for TestCase {
    fn drop(&mut self) {
        self.tear_down();
    }
}
