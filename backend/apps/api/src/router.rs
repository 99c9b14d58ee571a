//! Application Router

use accounts::domain::repository::AccountsStore;
use accounts::presentation::{accounts_routes, with_viewer};
use accounts::AccountsAppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use social::domain::repository::SocialStore;
use social::{SocialAppState, social_router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

/// Every API route with the session resolved once per request.
///
/// Both states must share the same accounts store so that tweet authors
/// and follow targets resolve against the users that log in.
pub fn build_router<A, S>(accounts: AccountsAppState<A>, social: SocialAppState<S, A>) -> Router
where
    A: AccountsStore,
    S: SocialStore,
{
    let app = accounts_routes(accounts.clone()).merge(social_router(social));
    with_viewer(app, accounts)
}

/// Tracing and CORS for the served app. Cookies need credentials, so
/// origins are listed explicitly.
pub fn with_http_layers(app: Router, frontend_origins: &[String]) -> Router {
    let allowed_origins: Vec<HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}
