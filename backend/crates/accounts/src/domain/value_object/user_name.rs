//! User Name Value Object
//!
//! The public handle a user logs in with.
//!
//! ## Rules
//! - NFKC normalized and trimmed, then lower-cased; only the lower-case
//!   canonical form is stored
//! - 6 to 20 characters
//! - `a-z`, `0-9`, `_`, `.`, `-`
//! - must not start or end with `.` or `-`

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 6;
pub const USER_NAME_MAX_LENGTH: usize = 20;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
    InvalidEdge { char: char },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str(kernel::validation::REQUIRED),
            Self::TooShort { min, .. } => {
                write!(f, "Ensure this field has at least {min} characters.")
            }
            Self::TooLong { max, .. } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
            Self::InvalidCharacter { .. } => f.write_str(
                "Enter a valid username. This value may contain only letters, numbers, and ./-/_ characters.",
            ),
            Self::InvalidEdge { char } => {
                write!(f, "Enter a valid username. It cannot start or end with '{char}'.")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

// ============================================================================
// UserName Value Object
// ============================================================================

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Normalize and validate user input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let canonical = Self::normalize(input.as_ref());
        Self::validate(&canonical)?;
        Ok(Self(canonical))
    }

    /// Normalize without validating.
    ///
    /// Used for lookups (login) and for rows already in storage, where the
    /// length rules may have been different when the row was written.
    pub fn from_db(value: &str) -> Self {
        Self(Self::normalize(value))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_lowercase()
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        if canonical.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some((position, char)) = canonical
            .chars()
            .enumerate()
            .find(|(_, c)| !Self::is_valid_char(*c))
        {
            return Err(UserNameError::InvalidCharacter { char, position });
        }

        for edge in [canonical.chars().next(), canonical.chars().next_back()]
            .into_iter()
            .flatten()
        {
            if edge == '.' || edge == '-' {
                return Err(UserNameError::InvalidEdge { char: edge });
            }
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&c)
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod normalization {
        use super::*;

        #[test]
        fn test_trim_and_lowercase() {
            let name = UserName::new("  LingHu  ").unwrap();
            assert_eq!(name.as_str(), "linghu");
        }

        #[test]
        fn test_nfkc_normalization() {
            // Full-width 'Ｌ' (U+FF2C)
            let name = UserName::new("Ｌinghu").unwrap();
            assert_eq!(name.as_str(), "linghu");
        }

        #[test]
        fn test_from_db_skips_rules() {
            let name = UserName::from_db("Abc");
            assert_eq!(name.as_str(), "abc");
        }
    }

    mod length_validation {
        use super::*;

        #[test]
        fn test_empty_fails() {
            assert!(matches!(UserName::new("   "), Err(UserNameError::Empty)));
        }

        #[test]
        fn test_too_short() {
            assert!(matches!(
                UserName::new("abcde"),
                Err(UserNameError::TooShort { length: 5, min: 6 })
            ));
        }

        #[test]
        fn test_bounds_inclusive() {
            assert!(UserName::new("abcdef").is_ok());
            assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        }

        #[test]
        fn test_too_long() {
            let err = UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)).unwrap_err();
            assert!(matches!(err, UserNameError::TooLong { .. }));
            assert_eq!(
                err.to_string(),
                "Ensure this field has no more than 20 characters."
            );
        }
    }

    mod character_validation {
        use super::*;

        #[test]
        fn test_allowed_specials() {
            assert!(UserName::new("alice_bob").is_ok());
            assert!(UserName::new("alice.bob").is_ok());
            assert!(UserName::new("alice-bob").is_ok());
            assert!(UserName::new("_alice_").is_ok());
        }

        #[test]
        fn test_invalid_special_char() {
            assert!(matches!(
                UserName::new("alice@bob"),
                Err(UserNameError::InvalidCharacter { char: '@', position: 5 })
            ));
        }

        #[test]
        fn test_inner_space_fails() {
            assert!(matches!(
                UserName::new("alice bob"),
                Err(UserNameError::InvalidCharacter { char: ' ', .. })
            ));
        }

        #[test]
        fn test_edges() {
            assert!(matches!(
                UserName::new(".alice"),
                Err(UserNameError::InvalidEdge { char: '.' })
            ));
            assert!(matches!(
                UserName::new("alice-"),
                Err(UserNameError::InvalidEdge { char: '-' })
            ));
        }
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<UserName>(r#""dongxie""#).is_ok());
        assert!(serde_json::from_str::<UserName>(r#""dx""#).is_err());
    }
}
