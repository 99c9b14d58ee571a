//! Social Backend Module
//!
//! - `domain/` - Tweets, comments, likes, friendships, newsfeeds
//! - `application/` - Services, feature-switched between Postgres and the column store
//! - `infra/` - PostgreSQL, in-memory and column store persistence
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Feature switches
//! - `switch_friendship_to_column_store` moves the follow graph to the
//!   `followings` / `followers` column tables
//! - `switch_newsfeed_to_column_store` moves feeds to the `newsfeeds` table

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use application::{FRIENDSHIP_SWITCH, NEWSFEED_SWITCH};
pub use error::{SocialError, SocialResult};
pub use infra::{COLUMN_TABLES, MemorySocialRepository, PgSocialRepository};
pub use presentation::{SocialAppState, social_router};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
