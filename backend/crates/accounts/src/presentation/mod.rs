//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::JsonBody;
pub use handlers::AccountsAppState;
pub use middleware::{ClientIp, Viewer, load_viewer, rate_limit};
pub use router::{
    accounts_app, accounts_router, accounts_routes, profiles_router, users_router, with_viewer,
};
