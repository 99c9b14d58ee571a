//! Social Router
//!
//! Session resolution is not applied here; the assembled app wraps every
//! route with `accounts::presentation::with_viewer`.

use accounts::domain::repository::AccountsStore;
use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::repository::SocialStore;
use crate::presentation::handlers::{self, SocialAppState};

/// Tweets, comments, likes, friendships and newsfeeds under `/api`.
pub fn social_router<S, U>(state: SocialAppState<S, U>) -> Router
where
    S: SocialStore,
    U: AccountsStore,
{
    let friendships = Router::new()
        .route("/{user_id}/follow", post(handlers::follow::<S, U>))
        .route("/{user_id}/unfollow", post(handlers::unfollow::<S, U>))
        .route("/{user_id}/followers", get(handlers::followers::<S, U>))
        .route("/{user_id}/followings", get(handlers::followings::<S, U>));

    Router::new()
        .route(
            "/api/tweets",
            get(handlers::list_tweets::<S, U>).post(handlers::create_tweet::<S, U>),
        )
        .route("/api/comments", post(handlers::create_comment::<S, U>))
        .route("/api/likes", post(handlers::create_like::<S, U>))
        .nest("/api/friendships", friendships)
        .route("/api/newsfeeds", get(handlers::list_newsfeeds::<S, U>))
        .with_state(state)
}
