//! User Password Value Object
//!
//! Thin domain layer over `platform::password`: the account password policy
//! (6 to 20 characters) and form-style error messages.

use platform::password::{
    ClearTextPassword, HashCost, HashedPassword, PasswordPolicy, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AccountsError, AccountsResult};

pub const PASSWORD_POLICY: PasswordPolicy = PasswordPolicy::new(6, 20);

/// Form message for a policy violation.
pub fn policy_message(err: &PasswordPolicyError) -> String {
    match err {
        PasswordPolicyError::TooShort { min, .. } => {
            format!("Ensure this field has at least {min} characters.")
        }
        PasswordPolicyError::TooLong { max, .. } => {
            format!("Ensure this field has no more than {max} characters.")
        }
        PasswordPolicyError::EmptyOrWhitespace => kernel::validation::REQUIRED.to_string(),
        PasswordPolicyError::InvalidCharacter => {
            "Password contains invalid control characters.".to_string()
        }
    }
}

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Clear text password from a request. Zeroized on drop.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate against the account policy.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw, &PASSWORD_POLICY).map(Self)
    }

    /// A login attempt. Never validated: the stored hash decides.
    pub fn attempt(raw: String) -> Self {
        Self(ClearTextPassword::new_unchecked(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(
        raw: &RawPassword,
        pepper: Option<&[u8]>,
        cost: HashCost,
    ) -> AccountsResult<Self> {
        raw.inner()
            .hash_with_cost(pepper, cost)
            .map(Self)
            .map_err(|e| AccountsError::Internal(e.to_string()))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AccountsResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AccountsError::Internal("Invalid password hash in storage".to_string()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_policy() {
        assert!(RawPassword::new("generic password".to_string()).is_ok());
        assert!(RawPassword::new("123456".to_string()).is_ok());

        let short = RawPassword::new("12345".to_string()).unwrap_err();
        assert_eq!(
            policy_message(&short),
            "Ensure this field has at least 6 characters."
        );

        let long = RawPassword::new("a".repeat(21)).unwrap_err();
        assert_eq!(
            policy_message(&long),
            "Ensure this field has no more than 20 characters."
        );
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("correct password".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None, HashCost::Low).unwrap();

        assert!(hashed.verify(&raw, None));
        assert!(!hashed.verify(&RawPassword::attempt("wrong password".to_string()), None));
    }

    #[test]
    fn test_attempt_skips_policy() {
        let raw = RawPassword::new("abcdef".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None, HashCost::Low).unwrap();

        // Too short to register with, but still checked against the hash.
        assert!(!hashed.verify(&RawPassword::attempt("abc".to_string()), None));
        assert!(hashed.verify(&RawPassword::attempt("abcdef".to_string()), None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("TestPassword1".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None, HashCost::Low).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));
        assert!(UserPassword::from_phc_string("plain").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::attempt("SecretPassword".to_string());
        assert!(!format!("{:?}", raw).contains("Secret"));
    }
}
