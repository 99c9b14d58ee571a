//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::id::{ProfileId, UserId};
use platform::cache::MemoryCache;
use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, ManageUsersUseCase, SignupInput, SignupUseCase,
    UpdateMode, UpdateProfileInput, UpdateProfileUseCase, UserPatch,
};
use crate::domain::entity::User;
use crate::domain::repository::AccountsStore;
use crate::error::{AccountsError, AccountsResult};
use crate::presentation::dto::{
    AdminUserDto, LoginRequest, LoginStatusResponse, ProfileResponse, ProfileUpdateRequest,
    SignupRequest, SuccessResponse, UserDto, UserPatchRequest,
};
use crate::presentation::extract::JsonBody;
use crate::presentation::middleware::{ClientIp, Viewer};

/// Shared state for accounts handlers
#[derive(Clone)]
pub struct AccountsAppState<S>
where
    S: AccountsStore,
{
    pub repo: Arc<S>,
    pub config: Arc<AccountsConfig>,
    /// Rate limit counters
    pub cache: MemoryCache,
}

impl<S> AccountsAppState<S>
where
    S: AccountsStore,
{
    pub fn new(repo: S, config: AccountsConfig, cache: MemoryCache) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            cache,
        }
    }
}

fn with_cookie(mut response: Response, cookie: Option<header::HeaderValue>) -> Response {
    match cookie {
        Some(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        None => tracing::error!("Session cookie could not be encoded as a header"),
    }
    response
}

// ============================================================================
// Login Status
// ============================================================================

/// GET /api/accounts/login_status
pub async fn login_status(viewer: Viewer, ClientIp(ip): ClientIp) -> Json<LoginStatusResponse> {
    Json(LoginStatusResponse {
        has_logged_in: viewer.is_authenticated(),
        ip: ip.map(|ip| ip.to_string()),
        user: viewer.user().map(UserDto::from),
    })
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/accounts/login
pub async fn login<S>(
    State(state): State<AccountsAppState<S>>,
    ClientIp(ip): ClientIp,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AccountsResult<Response>
where
    S: AccountsStore,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(
            LoginInput {
                username: req.username,
                password: req.password,
            },
            ip,
        )
        .await?;

    let cookie = state
        .config
        .cookie_config()
        .set_cookie_header(&output.session_token);

    Ok(with_cookie(
        Json(SuccessResponse::with_user(&output.user)).into_response(),
        cookie,
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/accounts/logout
pub async fn logout<S>(
    State(state): State<AccountsAppState<S>>,
    headers: HeaderMap,
) -> AccountsResult<Response>
where
    S: AccountsStore,
{
    let token = platform::cookie::extract_cookie(&headers, &state.config.session_cookie_name);

    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(token.as_deref()).await?;

    let cookie = state.config.cookie_config().delete_cookie_header();
    Ok(with_cookie(
        Json(SuccessResponse::ok()).into_response(),
        cookie,
    ))
}

// ============================================================================
// Signup
// ============================================================================

/// POST /api/accounts/signup
pub async fn signup<S>(
    State(state): State<AccountsAppState<S>>,
    ClientIp(ip): ClientIp,
    JsonBody(req): JsonBody<SignupRequest>,
) -> AccountsResult<Response>
where
    S: AccountsStore,
{
    let use_case = SignupUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(
            SignupInput {
                username: req.username,
                email: req.email,
                password: req.password,
            },
            ip,
        )
        .await?;

    let cookie = state
        .config
        .cookie_config()
        .set_cookie_header(&output.session_token);

    Ok(with_cookie(
        (
            StatusCode::CREATED,
            Json(SuccessResponse::with_user(&output.user)),
        )
            .into_response(),
        cookie,
    ))
}

// ============================================================================
// Profiles
// ============================================================================

fn parse_profile_id(raw: &str) -> AccountsResult<ProfileId> {
    raw.parse().map_err(|_| AccountsError::ProfileNotFound)
}

async fn update_profile<S>(
    state: AccountsAppState<S>,
    viewer: Viewer,
    profile_id: &str,
    req: ProfileUpdateRequest,
    mode: UpdateMode,
) -> AccountsResult<Json<ProfileResponse>>
where
    S: AccountsStore,
{
    // Anonymous callers get 403 before the id is looked at
    let user = viewer.user().ok_or(AccountsError::NotAuthenticated)?;
    let profile_id = parse_profile_id(profile_id)?;

    let use_case = UpdateProfileUseCase::new(state.repo.clone());
    let profile = use_case
        .execute(
            Some(user),
            profile_id,
            UpdateProfileInput {
                nickname: req.nickname,
                avatar_url: req.avatar_url,
            },
            mode,
        )
        .await?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// PUT /api/profiles/{profile_id}
pub async fn replace_profile<S>(
    State(state): State<AccountsAppState<S>>,
    viewer: Viewer,
    Path(profile_id): Path<String>,
    JsonBody(req): JsonBody<ProfileUpdateRequest>,
) -> AccountsResult<Json<ProfileResponse>>
where
    S: AccountsStore,
{
    update_profile(state, viewer, &profile_id, req, UpdateMode::Replace).await
}

/// PATCH /api/profiles/{profile_id}
pub async fn patch_profile<S>(
    State(state): State<AccountsAppState<S>>,
    viewer: Viewer,
    Path(profile_id): Path<String>,
    JsonBody(req): JsonBody<ProfileUpdateRequest>,
) -> AccountsResult<Json<ProfileResponse>>
where
    S: AccountsStore,
{
    update_profile(state, viewer, &profile_id, req, UpdateMode::Partial).await
}

// ============================================================================
// Admin Users
// ============================================================================

fn parse_user_id(raw: &str) -> AccountsResult<UserId> {
    raw.parse().map_err(|_| AccountsError::UserNotFound)
}

/// GET /api/users
pub async fn list_users<S>(
    State(state): State<AccountsAppState<S>>,
    viewer: Viewer,
) -> AccountsResult<Json<Vec<AdminUserDto>>>
where
    S: AccountsStore,
{
    let users = ManageUsersUseCase::new(state.repo.clone())
        .list(viewer.user())
        .await?;

    Ok(Json(users.iter().map(AdminUserDto::from).collect()))
}

/// GET /api/users/{user_id}
pub async fn retrieve_user<S>(
    State(state): State<AccountsAppState<S>>,
    viewer: Viewer,
    Path(user_id): Path<String>,
) -> AccountsResult<Json<AdminUserDto>>
where
    S: AccountsStore,
{
    let user = viewer.user();
    require_staff(user)?;
    let user_id = parse_user_id(&user_id)?;

    let managed = ManageUsersUseCase::new(state.repo.clone())
        .retrieve(user, user_id)
        .await?;

    Ok(Json(AdminUserDto::from(&managed)))
}

/// PATCH /api/users/{user_id}
pub async fn patch_user<S>(
    State(state): State<AccountsAppState<S>>,
    viewer: Viewer,
    Path(user_id): Path<String>,
    JsonBody(req): JsonBody<UserPatchRequest>,
) -> AccountsResult<Json<AdminUserDto>>
where
    S: AccountsStore,
{
    let user = viewer.user();
    require_staff(user)?;
    let user_id = parse_user_id(&user_id)?;

    let managed = ManageUsersUseCase::new(state.repo.clone())
        .update(
            user,
            user_id,
            UserPatch {
                email: req.email,
                is_staff: req.is_staff,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok(Json(AdminUserDto::from(&managed)))
}

/// DELETE /api/users/{user_id}
pub async fn delete_user<S>(
    State(state): State<AccountsAppState<S>>,
    viewer: Viewer,
    Path(user_id): Path<String>,
) -> AccountsResult<StatusCode>
where
    S: AccountsStore,
{
    let user = viewer.user();
    require_staff(user)?;
    let user_id = parse_user_id(&user_id)?;

    ManageUsersUseCase::new(state.repo.clone())
        .delete(user, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Staff check ahead of id parsing, so non-staff never learn which ids exist.
fn require_staff(user: Option<&User>) -> AccountsResult<()> {
    match user {
        None => Err(AccountsError::NotAuthenticated),
        Some(user) if !user.is_staff => Err(AccountsError::PermissionDenied),
        Some(_) => Ok(()),
    }
}
