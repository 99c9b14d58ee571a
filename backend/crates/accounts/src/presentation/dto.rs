//! API DTOs (Data Transfer Objects)
//!
//! Request fields are optional on purpose: a missing field is reported as a
//! field error by the use case instead of a JSON rejection.

use kernel::id::{ProfileId, UserId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::application::ManagedUser;
use crate::domain::entity::{User, UserProfile};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ============================================================================
// User
// ============================================================================

/// Public user representation
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            username: user.username.as_str().to_string(),
        }
    }
}

// ============================================================================
// Login Status / Login / Logout
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginStatusResponse {
    pub has_logged_in: bool,
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `{ "success": true, "user": {...} }`
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            user: None,
        }
    }

    pub fn with_user(user: &User) -> Self {
        Self {
            success: true,
            user: Some(user.into()),
        }
    }
}

// ============================================================================
// Signup
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdateRequest {
    #[serde(deserialize_with = "deserialize_some")]
    pub nickname: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub avatar_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: ProfileId,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&UserProfile> for ProfileResponse {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.profile_id,
            nickname: profile.nickname.as_ref().map(|n| n.as_str().to_string()),
            avatar_url: profile.avatar_url.as_ref().map(|u| u.as_str().to_string()),
        }
    }
}

// ============================================================================
// Admin Users
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserDto {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&ManagedUser> for AdminUserDto {
    fn from(managed: &ManagedUser) -> Self {
        let ManagedUser { user, profile } = managed;
        Self {
            id: user.user_id,
            username: user.username.as_str().to_string(),
            email: user.email.as_ref().map(|e| e.as_str().to_string()),
            is_staff: user.is_staff,
            is_active: user.is_active,
            nickname: profile.nickname.as_ref().map(|n| n.as_str().to_string()),
            avatar_url: profile.avatar_url.as_ref().map(|u| u.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatchRequest {
    #[serde(deserialize_with = "deserialize_some")]
    pub email: Option<Option<String>>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_distinguishes_null_from_absent() {
        let req: ProfileUpdateRequest =
            serde_json::from_str(r#"{"nickname": null}"#).unwrap();
        assert_eq!(req.nickname, Some(None));
        assert_eq!(req.avatar_url, None);

        let req: ProfileUpdateRequest =
            serde_json::from_str(r#"{"avatar_url": "https://a.example.com/x.png"}"#).unwrap();
        assert_eq!(req.nickname, None);
        assert_eq!(
            req.avatar_url,
            Some(Some("https://a.example.com/x.png".to_string()))
        );
    }

    #[test]
    fn test_login_request_missing_fields() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn test_login_status_omits_anonymous_user() {
        let body = serde_json::to_value(LoginStatusResponse {
            has_logged_in: false,
            ip: Some("127.0.0.1".to_string()),
            user: None,
        })
        .unwrap();

        assert_eq!(body["has_logged_in"], false);
        assert_eq!(body["ip"], "127.0.0.1");
        assert!(body.get("user").is_none());
    }
}
