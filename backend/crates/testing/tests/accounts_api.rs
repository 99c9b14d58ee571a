//! Accounts endpoints driven through the full router.

use std::net::SocketAddr;

use accounts::domain::repository::{UserProfileRepository, UserRepository};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use serde_json::json;
use testing::{TestCase, TestClient};

const LOGIN_STATUS_URL: &str = "/api/accounts/login_status";
const LOGIN_URL: &str = "/api/accounts/login";
const LOGOUT_URL: &str = "/api/accounts/logout";
const SIGNUP_URL: &str = "/api/accounts/signup";

// ============================================================================
// Login Status / Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_status_anonymous() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;

    let response = tc.anonymous_client().get(LOGIN_STATUS_URL).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "has_logged_in": false, "ip": "127.0.0.1" })
    );
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    tc.create_user("linghu", None, Some("correct password")).await?;
    let client = tc.client();

    let response = client
        .post(LOGIN_URL, json!({ "username": "linghu", "password": "wrong password" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "Username and password does not match." })
    );
    assert!(response.set_cookie(&tc.config.session_cookie_name).is_none());

    let status = client.get(LOGIN_STATUS_URL).await.json();
    assert_eq!(status["has_logged_in"], false);
    Ok(())
}

#[tokio::test]
async fn test_login_validation_errors() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let client = tc.client();

    let response = client.post(LOGIN_URL, json!({ "username": "linghu" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please check input.");
    assert_eq!(body["errors"]["password"], json!(["This field is required."]));

    let response = client
        .post(LOGIN_URL, json!({ "username": "nobody_here", "password": "whatever" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["errors"]["username"],
        json!(["User does not exist."])
    );
    Ok(())
}

#[tokio::test]
async fn test_login_and_logout() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let user = tc.create_user("linghu", None, None).await?;
    let client = tc.client();

    // Username and password are compared in lower case
    let response = client
        .post(LOGIN_URL, json!({ "username": "LingHu", "password": "Generic Password" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "success": true,
            "user": { "id": user.user_id.to_string(), "username": "linghu" },
        })
    );
    assert!(client.cookie(&tc.config.session_cookie_name).is_some());

    let stored = tc.accounts.find_user_by_id(&user.user_id).await?.unwrap();
    assert!(stored.last_login_at.is_some());

    let status = client.get(LOGIN_STATUS_URL).await.json();
    assert_eq!(status["has_logged_in"], true);
    assert_eq!(status["user"]["username"], "linghu");

    let response = client.post(LOGOUT_URL, json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "success": true }));
    assert!(client.cookie(&tc.config.session_cookie_name).is_none());

    let status = client.get(LOGIN_STATUS_URL).await.json();
    assert_eq!(status["has_logged_in"], false);
    Ok(())
}

#[tokio::test]
async fn test_inactive_user_cannot_login() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let mut user = tc.create_user("yingying", None, None).await?;
    user.set_active(false);
    tc.accounts.update_user(&user).await?;

    let response = tc
        .client()
        .post(LOGIN_URL, json!({ "username": "yingying", "password": "generic password" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Username and password does not match.");
    Ok(())
}

/// A client on its own address, so its calls do not share a throttle window.
fn client_at(tc: &TestCase, last_octet: u8) -> TestClient {
    tc.client()
        .with_remote_addr(SocketAddr::from(([10, 0, 1, last_octet], 40000)))
}

#[tokio::test]
async fn test_malformed_bodies_are_form_errors() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;

    // No body and no Content-Type: every field is missing
    let response = client_at(&tc, 1).send(Method::POST, LOGIN_URL, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please check input.");
    assert_eq!(body["errors"]["username"], json!(["This field is required."]));
    assert_eq!(body["errors"]["password"], json!(["This field is required."]));

    // JSON Content-Type with an empty body
    let response = client_at(&tc, 2)
        .with_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
        .send(Method::POST, LOGIN_URL, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["errors"]["non_field_errors"].is_array());

    let response = client_at(&tc, 3)
        .post(LOGIN_URL, json!({ "username": 12345678, "password": "generic password" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Please check input.");
    assert!(response.json()["errors"]["non_field_errors"].is_array());

    let client = client_at(&tc, 4);
    let response = client.post(SIGNUP_URL, json!([1, 2])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["non_field_errors"].is_array());

    let status = client.get(LOGIN_STATUS_URL).await.json();
    assert_eq!(status["has_logged_in"], false);
    Ok(())
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_logs_the_user_in() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let client = tc.client();

    let response = client
        .post(
            SIGNUP_URL,
            json!({
                "username": "Ren_WoXing",
                "email": "Ren@SunMoon.org",
                "password": "Star Absorbing",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "ren_woxing");

    let status = client.get(LOGIN_STATUS_URL).await.json();
    assert_eq!(status["has_logged_in"], true);
    assert_eq!(status["user"]["username"], "ren_woxing");

    // Stored lower-cased; the lower-cased password logs in
    let response = tc
        .client()
        .post(LOGIN_URL, json!({ "username": "ren_woxing", "password": "star absorbing" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_signup_validation() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let client = tc.client();

    let response = client
        .post(
            SIGNUP_URL,
            json!({ "username": "abc", "email": "not-an-email", "password": "12" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please check input.");
    for field in ["username", "email", "password"] {
        assert!(body["errors"][field].is_array(), "missing error for {field}");
    }

    let status = client.get(LOGIN_STATUS_URL).await.json();
    assert_eq!(status["has_logged_in"], false);
    Ok(())
}

#[tokio::test]
async fn test_signup_rejects_taken_username_and_email() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    tc.create_user("linghu", Some("linghu@huashan.org"), None)
        .await?;

    let response = tc
        .client()
        .post(
            SIGNUP_URL,
            json!({
                "username": "LINGHU",
                "email": "LingHu@HuaShan.org",
                "password": "lonely nine",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = &response.json()["errors"];
    assert_eq!(errors["username"], json!(["This username has been occupied."]));
    assert_eq!(errors["email"], json!(["This email address has been occupied."]));
    Ok(())
}

// ============================================================================
// Rate Limiting
// ============================================================================

#[tokio::test]
async fn test_accounts_endpoints_are_rate_limited_per_ip() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let client = tc.client();

    // 3/s over aligned windows: seven quick calls cannot all fit in two windows.
    let mut statuses = Vec::new();
    for _ in 0..7 {
        statuses.push(client.get(LOGIN_STATUS_URL).await);
    }
    assert_eq!(statuses[0].status, StatusCode::OK);
    let limited = statuses
        .iter()
        .find(|r| r.status == StatusCode::TOO_MANY_REQUESTS)
        .expect("at least one request should be throttled");
    assert!(limited.header("retry-after").is_some());

    // Other addresses and other endpoints keep their own counters
    let other: SocketAddr = "10.0.0.2:40000".parse()?;
    let response = tc
        .client()
        .with_remote_addr(other)
        .get(LOGIN_STATUS_URL)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["ip"], "10.0.0.2");

    let response = client.post(LOGOUT_URL, json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_forwarded_for_does_not_reset_rate_limit() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let forwarded_for = HeaderName::from_static("x-forwarded-for");

    // One peer rotating X-Forwarded-For still shares one counter
    let mut responses = Vec::new();
    for i in 0..8 {
        let client = tc.client().with_header(
            forwarded_for.clone(),
            HeaderValue::from_str(&format!("10.0.0.{i}"))?,
        );
        responses.push(client.get(LOGIN_STATUS_URL).await);
    }
    assert_eq!(responses[0].status, StatusCode::OK);
    assert_eq!(responses[0].json()["ip"], "10.0.0.0");
    assert!(
        responses
            .iter()
            .any(|r| r.status == StatusCode::TOO_MANY_REQUESTS)
    );
    Ok(())
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn test_profile_update_requires_owner() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (owner, owner_client) = tc.create_user_and_client("linghu").await?;
    let (_, other_client) = tc.create_user_and_client("yingying").await?;
    let profile = tc.accounts.find_profile_by_user_id(&owner.user_id).await?.unwrap();
    let url = format!("/api/profiles/{}", profile.profile_id);

    let response = tc
        .anonymous_client()
        .patch(&url, json!({ "nickname": "Chong" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = other_client.patch(&url, json!({ "nickname": "Chong" })).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = owner_client.patch(&url, json!({ "nickname": "Chong" })).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["nickname"], "Chong");
    assert_eq!(body["avatar_url"], json!(null));

    // PUT replaces both fields
    let response = owner_client
        .put(&url, json!({ "avatar_url": "https://img.example.com/linghu.png" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["nickname"], json!(null));
    assert_eq!(body["avatar_url"], "https://img.example.com/linghu.png");
    Ok(())
}

#[tokio::test]
async fn test_profile_update_errors() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (owner, client) = tc.create_user_and_client("linghu").await?;
    let profile = tc.accounts.find_profile_by_user_id(&owner.user_id).await?.unwrap();

    let response = client
        .patch(
            &format!("/api/profiles/{}", profile.profile_id),
            json!({ "avatar_url": "ftp://img.example.com/x.png" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["errors"]["avatar_url"].is_array());

    let missing = accounts::models::UserProfile::empty_for(owner.user_id).profile_id;
    let response = client
        .patch(&format!("/api/profiles/{missing}"), json!({ "nickname": "x" }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    Ok(())
}

// ============================================================================
// Admin Users
// ============================================================================

#[tokio::test]
async fn test_user_admin_is_staff_only() -> anyhow::Result<()> {
    let tc = TestCase::set_up()?;
    let (mut admin, admin_client) = tc.create_user_and_client("dongfang").await?;
    admin.set_staff(true);
    tc.accounts.update_user(&admin).await?;
    let (member, member_client) = tc.create_user_and_client("linghu").await?;

    assert_eq!(
        member_client.get("/api/users").await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        tc.anonymous_client().get("/api/users").await.status,
        StatusCode::FORBIDDEN
    );

    let response = admin_client.get("/api/users").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().map(Vec::len), Some(2));

    let url = format!("/api/users/{}", member.user_id);
    let response = admin_client
        .patch(&url, json!({ "email": "Chong@HuaShan.org", "is_active": false }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["email"], "chong@huashan.org");
    assert_eq!(body["is_active"], false);

    let response = admin_client.delete(&url).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(admin_client.get(&url).await.status, StatusCode::NOT_FOUND);
    assert!(tc.accounts.find_profile_by_user_id(&member.user_id).await?.is_none());
    Ok(())
}
