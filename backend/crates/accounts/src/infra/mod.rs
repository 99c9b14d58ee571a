//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryAccountsRepository;
pub use postgres::PgAccountsRepository;
