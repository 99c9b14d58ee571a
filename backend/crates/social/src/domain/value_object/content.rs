//! Tweet and Comment Content
//!
//! Trimmed text with per-kind length bounds, counted in characters.

use serde::Serialize;
use std::fmt;

pub const TWEET_MIN_LENGTH: usize = 6;
pub const TWEET_MAX_LENGTH: usize = 140;
pub const COMMENT_MIN_LENGTH: usize = 1;
pub const COMMENT_MAX_LENGTH: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    Blank,
    TooShort { min: usize },
    TooLong { max: usize },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("This field may not be blank."),
            Self::TooShort { min } => write!(f, "Ensure this field has at least {min} characters."),
            Self::TooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
        }
    }
}

impl std::error::Error for ContentError {}

fn checked(raw: &str, min: usize, max: usize) -> Result<String, ContentError> {
    let value = raw.trim();
    let len = value.chars().count();
    if len == 0 {
        return Err(ContentError::Blank);
    }
    if len < min {
        return Err(ContentError::TooShort { min });
    }
    if len > max {
        return Err(ContentError::TooLong { max });
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TweetContent(String);

impl TweetContent {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContentError> {
        checked(raw.as_ref(), TWEET_MIN_LENGTH, TWEET_MAX_LENGTH).map(Self)
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentContent(String);

impl CommentContent {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContentError> {
        checked(raw.as_ref(), COMMENT_MIN_LENGTH, COMMENT_MAX_LENGTH).map(Self)
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
