//! Accounts Routers
//!
//! Three routers sharing one state: `/api/accounts`, `/api/users` and
//! `/api/profiles` once nested by the API. None of them resolves the session
//! on its own; wrap the assembled app with [`with_viewer`].

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::domain::repository::AccountsStore;
use crate::presentation::handlers::{self, AccountsAppState};
use crate::presentation::middleware::{load_viewer, rate_limit};

/// Login status, login, logout and signup, each rate limited per client IP.
pub fn accounts_router<S>(state: AccountsAppState<S>) -> Router
where
    S: AccountsStore,
{
    Router::new()
        .route("/login_status", get(handlers::login_status))
        .route("/login", post(handlers::login::<S>))
        .route("/logout", post(handlers::logout::<S>))
        .route("/signup", post(handlers::signup::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::<S>,
        ))
        .with_state(state)
}

/// Staff-only user administration.
pub fn users_router<S>(state: AccountsAppState<S>) -> Router
where
    S: AccountsStore,
{
    Router::new()
        .route("/", get(handlers::list_users::<S>))
        .route(
            "/{user_id}",
            get(handlers::retrieve_user::<S>)
                .patch(handlers::patch_user::<S>)
                .delete(handlers::delete_user::<S>),
        )
        .with_state(state)
}

/// Owner-only profile edits.
pub fn profiles_router<S>(state: AccountsAppState<S>) -> Router
where
    S: AccountsStore,
{
    Router::new()
        .route(
            "/{profile_id}",
            put(handlers::replace_profile::<S>).patch(handlers::patch_profile::<S>),
        )
        .with_state(state)
}

/// Resolve the session cookie for every route of `app`.
pub fn with_viewer<S>(app: Router, state: AccountsAppState<S>) -> Router
where
    S: AccountsStore,
{
    app.layer(middleware::from_fn_with_state(state, load_viewer::<S>))
}

/// All accounts routes under their `/api` prefixes, without viewer
/// resolution. Merge further routers before wrapping with [`with_viewer`].
pub fn accounts_routes<S>(state: AccountsAppState<S>) -> Router
where
    S: AccountsStore,
{
    Router::new()
        .nest("/api/accounts", accounts_router(state.clone()))
        .nest("/api/users", users_router(state.clone()))
        .nest("/api/profiles", profiles_router(state))
}

/// Accounts routes with viewer resolution applied.
pub fn accounts_app<S>(state: AccountsAppState<S>) -> Router
where
    S: AccountsStore,
{
    with_viewer(accounts_routes(state.clone()), state)
}
