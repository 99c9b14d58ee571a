//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{ProfileChanges, Session, User, UserProfile};
pub use repository::{AccountsStore, SessionRepository, UserProfileRepository, UserRepository};
