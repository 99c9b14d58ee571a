//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Random material, HMAC-signed tokens, Base64
//! - Password hashing (Argon2id)
//! - Cookie and client address helpers
//! - In-process cache, rate limiting and feature switches on top of it
//! - In-process wide-column store

pub mod cache;
pub mod client;
pub mod column_store;
pub mod cookie;
pub mod crypto;
pub mod gatekeeper;
pub mod password;
pub mod rate_limit;
