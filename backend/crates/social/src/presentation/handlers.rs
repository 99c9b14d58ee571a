//! HTTP Handlers

use std::collections::HashMap;
use std::sync::Arc;

use accounts::Viewer;
use accounts::domain::repository::AccountsStore;
use accounts::models::User;
use accounts::presentation::JsonBody;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::id::UserId;
use platform::column_store::ColumnStore;
use platform::gatekeeper::GateKeeper;

use crate::application::newsfeed::DEFAULT_FEED_LIMIT;
use crate::application::{CommentService, FriendshipService, LikeService, TweetService};
use crate::domain::entity::{LikeTarget, Tweet};
use crate::domain::repository::SocialStore;
use crate::error::{SocialError, SocialResult};
use crate::presentation::dto::{
    CommentDto, CreateCommentRequest, CreateLikeRequest, CreateTweetRequest, FollowResponse,
    FriendshipDto, FriendshipListResponse, LikeDto, NewsFeedDto, NewsFeedListResponse,
    NewsFeedQuery, TweetDto, TweetListQuery, TweetListResponse, UnfollowResponse,
};

/// Shared state for social handlers
#[derive(Clone)]
pub struct SocialAppState<S, U>
where
    S: SocialStore,
    U: AccountsStore,
{
    pub repo: Arc<S>,
    /// Authors and follow targets are resolved through the accounts store
    pub users: Arc<U>,
    pub columns: ColumnStore,
    pub gatekeeper: GateKeeper,
}

impl<S, U> SocialAppState<S, U>
where
    S: SocialStore,
    U: AccountsStore,
{
    pub fn new(repo: S, users: U, columns: ColumnStore, gatekeeper: GateKeeper) -> Self {
        Self {
            repo: Arc::new(repo),
            users: Arc::new(users),
            columns,
            gatekeeper,
        }
    }

    fn tweets(&self) -> TweetService<S> {
        TweetService::new(self.repo.clone(), self.columns.clone(), self.gatekeeper.clone())
    }

    fn friendships(&self) -> FriendshipService<S> {
        FriendshipService::new(self.repo.clone(), self.columns.clone(), self.gatekeeper.clone())
    }

    /// Load every user in `ids` once. Unknown ids are left out.
    async fn load_users(
        &self,
        ids: Vec<UserId>,
    ) -> SocialResult<HashMap<UserId, User>> {
        let mut users = HashMap::new();
        for id in ids {
            if users.contains_key(&id) {
                continue;
            }
            if let Some(user) = self.users.find_user_by_id(&id).await? {
                users.insert(id, user);
            }
        }
        Ok(users)
    }

    /// Render tweets for `viewer`, skipping any whose author is gone.
    async fn render_tweets(
        &self,
        viewer: Option<&User>,
        tweets: &[Tweet],
    ) -> SocialResult<Vec<TweetDto>> {
        let authors = self
            .load_users(tweets.iter().map(|t| t.user_id).collect())
            .await?;
        let likes = LikeService::new(self.repo.clone());

        let mut rendered = Vec::with_capacity(tweets.len());
        for tweet in tweets {
            let Some(author) = authors.get(&tweet.user_id) else {
                tracing::warn!(tweet_id = %tweet.tweet_id, "Tweet author missing");
                continue;
            };
            let has_liked = match viewer {
                Some(viewer) => Some(
                    likes
                        .has_liked(&viewer.user_id, &LikeTarget::Tweet(tweet.tweet_id))
                        .await?,
                ),
                None => None,
            };
            rendered.push(TweetDto::new(tweet, author, has_liked));
        }
        Ok(rendered)
    }
}

fn require_login(viewer: &Viewer) -> SocialResult<&User> {
    viewer.user().ok_or(SocialError::NotAuthenticated)
}

fn parse_user_id(raw: &str) -> SocialResult<UserId> {
    raw.parse().map_err(|_| SocialError::UserNotFound)
}

// ============================================================================
// Tweets
// ============================================================================

/// POST /api/tweets
pub async fn create_tweet<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    JsonBody(req): JsonBody<CreateTweetRequest>,
) -> SocialResult<(StatusCode, Json<TweetDto>)>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user = require_login(&viewer)?;
    let tweet = state
        .tweets()
        .create(user.user_id, req.content.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TweetDto::new(&tweet, user, Some(false))),
    ))
}

/// GET /api/tweets?user_id=
pub async fn list_tweets<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    Query(query): Query<TweetListQuery>,
) -> SocialResult<Json<TweetListResponse>>
where
    S: SocialStore,
    U: AccountsStore,
{
    let raw = query
        .user_id
        .ok_or(SocialError::MissingParameter("user_id"))?;
    // An id that cannot exist simply has no tweets.
    let tweets = match raw.parse::<UserId>() {
        Ok(user_id) => state.tweets().list_by_user(&user_id).await?,
        Err(_) => Vec::new(),
    };

    Ok(Json(TweetListResponse {
        tweets: state.render_tweets(viewer.user(), &tweets).await?,
    }))
}

// ============================================================================
// Comments
// ============================================================================

/// POST /api/comments
pub async fn create_comment<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> SocialResult<(StatusCode, Json<CommentDto>)>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user = require_login(&viewer)?;
    let comment = CommentService::new(state.repo.clone())
        .create(user.user_id, req.tweet_id.as_deref(), req.content.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(CommentDto::new(&comment, user))))
}

// ============================================================================
// Likes
// ============================================================================

/// POST /api/likes
pub async fn create_like<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    JsonBody(req): JsonBody<CreateLikeRequest>,
) -> SocialResult<(StatusCode, Json<LikeDto>)>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user = require_login(&viewer)?;
    let likes = LikeService::new(state.repo.clone());
    let target = likes
        .resolve_target(req.content_type.as_deref(), req.object_id.as_deref())
        .await?;
    let (like, _) = likes.like(user.user_id, target).await?;

    Ok((StatusCode::CREATED, Json(LikeDto::new(&like, user))))
}

// ============================================================================
// Friendships
// ============================================================================

/// POST /api/friendships/{user_id}/follow
pub async fn follow<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    Path(user_id): Path<String>,
) -> SocialResult<(StatusCode, Json<FollowResponse>)>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user = require_login(&viewer)?;
    let to = parse_user_id(&user_id)?;
    if to == user.user_id {
        return Err(SocialError::FollowSelf);
    }
    let followed = state
        .users
        .find_user_by_id(&to)
        .await?
        .ok_or(SocialError::UserNotFound)?;

    let (friendship, created) = state.friendships().follow(user.user_id, to).await?;
    let body = if created {
        FollowResponse::created(&friendship, &followed)
    } else {
        FollowResponse::duplicate()
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /api/friendships/{user_id}/unfollow
pub async fn unfollow<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    Path(user_id): Path<String>,
) -> SocialResult<Json<UnfollowResponse>>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user = require_login(&viewer)?;
    let to = parse_user_id(&user_id)?;
    if to == user.user_id {
        return Err(SocialError::UnfollowSelf);
    }
    if state.users.find_user_by_id(&to).await?.is_none() {
        return Err(SocialError::UserNotFound);
    }

    let deleted = state.friendships().unfollow(user.user_id, to).await?;
    Ok(Json(UnfollowResponse {
        success: true,
        deleted,
    }))
}

/// GET /api/friendships/{user_id}/followers
pub async fn followers<S, U>(
    State(state): State<SocialAppState<S, U>>,
    Path(user_id): Path<String>,
) -> SocialResult<Json<FriendshipListResponse>>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user_id = parse_user_id(&user_id)?;
    let relations = state.friendships().followers(&user_id).await?;
    let users = state
        .load_users(relations.iter().map(|f| f.from_user_id).collect())
        .await?;

    let results = relations
        .iter()
        .filter_map(|f| {
            users.get(&f.from_user_id).map(|u| FriendshipDto {
                user: u.into(),
                created_at: f.created_at,
            })
        })
        .collect();
    Ok(Json(FriendshipListResponse { results }))
}

/// GET /api/friendships/{user_id}/followings
pub async fn followings<S, U>(
    State(state): State<SocialAppState<S, U>>,
    Path(user_id): Path<String>,
) -> SocialResult<Json<FriendshipListResponse>>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user_id = parse_user_id(&user_id)?;
    let relations = state.friendships().followings(&user_id).await?;
    let users = state
        .load_users(relations.iter().map(|f| f.to_user_id).collect())
        .await?;

    let results = relations
        .iter()
        .filter_map(|f| {
            users.get(&f.to_user_id).map(|u| FriendshipDto {
                user: u.into(),
                created_at: f.created_at,
            })
        })
        .collect();
    Ok(Json(FriendshipListResponse { results }))
}

// ============================================================================
// NewsFeeds
// ============================================================================

/// GET /api/newsfeeds
pub async fn list_newsfeeds<S, U>(
    State(state): State<SocialAppState<S, U>>,
    viewer: Viewer,
    Query(query): Query<NewsFeedQuery>,
) -> SocialResult<Json<NewsFeedListResponse>>
where
    S: SocialStore,
    U: AccountsStore,
{
    let user = require_login(&viewer)?;
    let entries = state
        .tweets()
        .newsfeed(&user.user_id, query.limit.unwrap_or(DEFAULT_FEED_LIMIT))
        .await?;

    let tweets: Vec<Tweet> = entries.iter().map(|(_, tweet)| tweet.clone()).collect();
    let rendered = state.render_tweets(Some(user), &tweets).await?;

    // render_tweets may drop tweets whose author is gone; pair by id.
    let mut by_id: HashMap<_, _> = rendered.into_iter().map(|dto| (dto.id, dto)).collect();
    let newsfeeds = entries
        .iter()
        .filter_map(|(feed, tweet)| {
            by_id
                .remove(&tweet.tweet_id)
                .map(|dto| NewsFeedDto::new(feed, dto))
        })
        .collect();

    Ok(Json(NewsFeedListResponse { newsfeeds }))
}
