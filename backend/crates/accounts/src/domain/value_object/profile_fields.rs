//! Profile field value objects

use serde::Serialize;
use std::fmt;

pub const NICKNAME_MAX_LENGTH: usize = 200;
pub const AVATAR_URL_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileFieldError {
    TooLong { max: usize },
    InvalidUrl,
}

impl fmt::Display for ProfileFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
            Self::InvalidUrl => f.write_str("Enter a valid URL."),
        }
    }
}

impl std::error::Error for ProfileFieldError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ProfileFieldError> {
        let value = value.as_ref().trim();
        if value.chars().count() > NICKNAME_MAX_LENGTH {
            return Err(ProfileFieldError::TooLong {
                max: NICKNAME_MAX_LENGTH,
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `http://` or `https://` URL of an externally hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AvatarUrl(String);

impl AvatarUrl {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ProfileFieldError> {
        let value = value.as_ref().trim();
        if value.chars().count() > AVATAR_URL_MAX_LENGTH {
            return Err(ProfileFieldError::TooLong {
                max: AVATAR_URL_MAX_LENGTH,
            });
        }

        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"))
            .ok_or(ProfileFieldError::InvalidUrl)?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || rest.chars().any(char::is_whitespace) {
            return Err(ProfileFieldError::InvalidUrl);
        }

        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_length() {
        assert!(Nickname::new("Dong Xie").is_ok());
        assert!(Nickname::new("n".repeat(NICKNAME_MAX_LENGTH)).is_ok());
        assert_eq!(
            Nickname::new("n".repeat(NICKNAME_MAX_LENGTH + 1)),
            Err(ProfileFieldError::TooLong { max: 200 })
        );
    }

    #[test]
    fn test_avatar_url() {
        assert!(AvatarUrl::new("https://cdn.example.com/a.png").is_ok());
        assert!(AvatarUrl::new("http://localhost:8000/media/x.jpg").is_ok());

        for bad in ["ftp://example.com/a.png", "https://", "example.com/a.png", "https://a b/c"] {
            assert_eq!(AvatarUrl::new(bad), Err(ProfileFieldError::InvalidUrl), "{bad}");
        }

        let long = format!("https://example.com/{}", "a".repeat(AVATAR_URL_MAX_LENGTH));
        assert!(matches!(AvatarUrl::new(long), Err(ProfileFieldError::TooLong { .. })));
    }
}
