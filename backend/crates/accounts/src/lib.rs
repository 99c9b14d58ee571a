//! Accounts Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, middleware, routers
//!
//! ## Features
//! - Login / logout / signup / login status, rate limited per client IP
//! - Server-side sessions behind an HMAC-signed cookie
//! - Owner-only profile editing
//! - Staff-only user administration
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Usernames, emails and passwords compared in lower case
//! - Inactive users cannot log in and their sessions stop resolving

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AccountsConfig;
pub use error::{AccountsError, AccountsResult};
pub use infra::{MemoryAccountsRepository, PgAccountsRepository};
pub use presentation::{AccountsAppState, ClientIp, Viewer, accounts_app};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
