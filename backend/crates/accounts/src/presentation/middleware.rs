//! Accounts Middleware
//!
//! `load_viewer` resolves the session cookie once per request and stores the
//! result in the request extensions; handlers read it back through the
//! [`Viewer`] and [`ClientIp`] extractors. `rate_limit` throttles per client
//! IP, endpoint and method.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts, MatchedPath, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::extract_client_ip;
use platform::rate_limit::RateLimitStore;

use crate::application::ResolveSessionUseCase;
use crate::domain::entity::User;
use crate::domain::repository::AccountsStore;
use crate::error::AccountsError;
use crate::presentation::handlers::AccountsAppState;

// ============================================================================
// Extensions
// ============================================================================

/// Who is making the request
#[derive(Debug, Clone, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(Box<User>),
}

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(user) => Some(&**user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Viewer>().cloned().unwrap_or_default())
    }
}

/// Client address, `X-Forwarded-For` first
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    fn from_parts(parts: &Parts) -> Self {
        let direct = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        ClientIp(extract_client_ip(&parts.headers, direct))
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ClientIp>()
            .copied()
            .unwrap_or_else(|| ClientIp::from_parts(parts)))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolve the session cookie into a [`Viewer`].
///
/// Storage failures are logged and the request continues anonymously.
pub async fn load_viewer<S>(
    State(state): State<AccountsAppState<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: AccountsStore,
{
    let (mut parts, body) = req.into_parts();
    let client_ip = ClientIp::from_parts(&parts);

    let token = platform::cookie::extract_cookie(&parts.headers, &state.config.session_cookie_name);
    let viewer = match token {
        None => Viewer::Anonymous,
        Some(token) => {
            let use_case = ResolveSessionUseCase::new(state.repo.clone(), state.config.clone());
            match use_case.execute(&token).await {
                Ok(Some(user)) => Viewer::Authenticated(Box::new(user)),
                Ok(None) => Viewer::Anonymous,
                Err(e) => {
                    tracing::warn!(error = %e, "Session lookup failed, continuing anonymously");
                    Viewer::Anonymous
                }
            }
        }
    };

    parts.extensions.insert(client_ip);
    parts.extensions.insert(viewer);

    next.run(Request::from_parts(parts, body)).await
}

/// Address the throttle counts against. `X-Forwarded-For` is client supplied,
/// so it is used only when the deployment says a proxy sets it.
fn throttle_ip(parts: &Parts, trust_forwarded_for: bool) -> Option<IpAddr> {
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    if trust_forwarded_for {
        extract_client_ip(&parts.headers, peer)
    } else {
        peer
    }
}

/// Fixed-window throttle keyed by route, method and client IP.
///
/// Apply with `route_layer` so that `MatchedPath` is available. Store
/// failures let the request through.
pub async fn rate_limit<S>(
    State(state): State<AccountsAppState<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: AccountsStore,
{
    let (parts, body) = req.into_parts();

    let path = parts
        .extensions
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let ip = throttle_ip(&parts, state.config.trust_forwarded_for)
        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string());
    let key = format!("accounts:{}:{}:{}", path, parts.method, ip);

    match state
        .cache
        .check_and_increment(&key, &state.config.rate_limit)
        .await
    {
        Ok(result) if !result.allowed => {
            let now_ms = chrono::Utc::now().timestamp_millis();
            let retry_after_secs = ((result.reset_at_ms - now_ms).max(0) as u64).div_ceil(1000);
            return AccountsError::RateLimited {
                retry_after_secs: retry_after_secs.max(1),
            }
            .into_response();
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Rate limit check failed, allowing request");
        }
    }

    next.run(Request::from_parts(parts, body)).await
}
