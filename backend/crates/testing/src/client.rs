//! In-process HTTP client
//!
//! Drives the router with `tower::ServiceExt::oneshot`. Each client keeps
//! its own cookie jar and presents a fixed peer address, so the session
//! and rate limit middleware see what a browser behind that address would.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, header};
use dashmap::DashMap;
use serde_json::Value;
use tower::ServiceExt;

#[derive(Clone)]
pub struct TestClient {
    app: Router,
    cookies: Arc<DashMap<String, String>>,
    remote_addr: SocketAddr,
    /// Sent with every request, replacing any header of the same name
    headers: HeaderMap,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: Arc::new(DashMap::new()),
            remote_addr: SocketAddr::from(([127, 0, 0, 1], 50000)),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_remote_addr(mut self, remote_addr: SocketAddr) -> Self {
        self.remote_addr = remote_addr;
        self
    }

    /// Same cookie jar, one more header on every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn set_cookie(&self, name: &str, value: impl Into<String>) {
        self.cookies.insert(name.to_string(), value.into());
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|v| v.clone())
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = body.map_or_else(Body::empty, |json| Body::from(json.to_string()));
        let mut request = match builder.body(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, uri, "Invalid test request");
                return TestResponse::empty(StatusCode::BAD_REQUEST);
            }
        };
        request.headers_mut().extend(self.headers.clone());
        request
            .extensions_mut()
            .insert(ConnectInfo(self.remote_addr));

        let response = match self.app.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        let headers = response.headers().clone();
        self.store_cookies(&headers);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|entry| format!("{}={}", entry.key(), entry.value()))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Apply `Set-Cookie` headers. An empty value or `Max-Age=0` removes the cookie.
    fn store_cookies(&self, headers: &HeaderMap) {
        for raw in headers.get_all(header::SET_COOKIE).iter() {
            let Some((name, value, expired)) = parse_set_cookie(raw) else {
                continue;
            };
            if expired || value.is_empty() {
                self.cookies.remove(&name);
            } else {
                self.cookies.insert(name, value);
            }
        }
    }
}

fn parse_set_cookie(raw: &HeaderValue) -> Option<(String, String, bool)> {
    let raw = raw.to_str().ok()?;
    let mut parts = raw.split(';').map(str::trim);
    let (name, value) = parts.next()?.split_once('=')?;
    let expired = parts.any(|attr| attr.eq_ignore_ascii_case("Max-Age=0"));
    Some((name.to_string(), value.to_string(), expired))
}

/// A fully buffered response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Body as JSON; `Value::Null` when the body is empty or not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value set for the named cookie by this response, if any.
    /// Same cookie jar, one more header on every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(parse_set_cookie)
            .find(|(cookie, _, _)| cookie == name)
            .map(|(_, value, _)| value)
    }
}
