//! Cryptographic Utilities
//!
//! Random material, base64 helpers and HMAC-signed tokens used for
//! session cookies.

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not in payload.signature form")]
    Malformed,
    #[error("token signature is not valid base64")]
    Encoding,
    #[error("token signature does not match")]
    BadSignature,
    #[error("signing key rejected")]
    InvalidKey,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

fn mac_for(secret: &[u8], payload: &str) -> Result<HmacSha256, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Sign `payload` and return `payload.signature`.
///
/// The signature is HMAC-SHA256 encoded as unpadded URL-safe base64, so the
/// result is safe to place in a cookie value.
pub fn sign_token(secret: &[u8], payload: &str) -> Result<String, TokenError> {
    let signature = mac_for(secret, payload)?.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        payload,
        general_purpose::URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a token produced by [`sign_token`] and return its payload.
///
/// Comparison is constant time.
pub fn verify_token<'a>(secret: &[u8], token: &'a str) -> Result<&'a str, TokenError> {
    let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
    if payload.is_empty() || signature.is_empty() {
        return Err(TokenError::Malformed);
    }
    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Encoding)?;

    mac_for(secret, payload)?
        .verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"an-unremarkable-test-secret-key!";

    #[test]
    fn test_sha256_known_value() {
        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert_ne!(random_bytes(32), bytes);
    }

    #[test]
    fn test_sign_and_verify() {
        let token = sign_token(SECRET, "4f9c2b1e-session").unwrap();
        assert!(token.starts_with("4f9c2b1e-session."));
        assert_eq!(verify_token(SECRET, &token).unwrap(), "4f9c2b1e-session");
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let token = sign_token(SECRET, "abc").unwrap();
        let forged = token.replacen("abc", "abd", 1);
        assert_eq!(verify_token(SECRET, &forged), Err(TokenError::BadSignature));

        assert_eq!(
            verify_token(b"some-other-secret", &token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_verify_rejects_malformed() {
        assert_eq!(verify_token(SECRET, "no-dot"), Err(TokenError::Malformed));
        assert_eq!(verify_token(SECRET, ".sig"), Err(TokenError::Malformed));
        assert_eq!(verify_token(SECRET, "abc.!!!"), Err(TokenError::Encoding));
    }
}
