//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Typed identifiers shared by the accounts and social domains
//! - Field-level validation errors rendered by every write endpoint
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod validation;

pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
pub use validation::FieldErrors;
