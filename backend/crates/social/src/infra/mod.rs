pub mod columns;
pub mod memory;
pub mod postgres;

pub use columns::{COLUMN_TABLES, ColumnFriendships, ColumnNewsFeeds};
pub use memory::MemorySocialRepository;
pub use postgres::PgSocialRepository;
