//! API Assembly
//!
//! Router assembly and environment configuration shared by the server
//! binary and the acceptance test harness.

pub mod config;
pub mod router;

pub use config::ServerConfig;
pub use router::{build_router, with_http_layers};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
